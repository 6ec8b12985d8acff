use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Real};
use crate::shape::half_edge_mesh::{HalfEdgeMesh, MeshError};
use crate::shape::ConvexCollider;
use crate::transformation::hacd::{Hacd, HacdParameters};

/// A concave collider: a static set of convex parts, each wrapped in its own
/// [`ConvexCollider`], pre-computed offline by convex decomposition.
#[derive(Debug, Clone)]
pub struct ConcaveCollider {
    parts: Vec<ConvexCollider>,
    pose: Isometry<Real>,
    aabb: Aabb,
}

impl ConcaveCollider {
    /// Creates a concave collider from already-convex parts.
    ///
    /// Every part hull must be expressed in the collider's local space:
    /// [`ConcaveCollider::set_pose`] propagates the collider pose to all
    /// parts, overwriting whatever pose a part had.
    pub fn new(parts: Vec<ConvexCollider>) -> Result<Self, MeshError> {
        if parts.is_empty() {
            return Err(MeshError::Empty);
        }

        let aabb = parts
            .iter()
            .fold(Aabb::new_invalid(), |acc, p| acc.merged(p.aabb()));

        Ok(ConcaveCollider {
            parts,
            pose: Isometry::identity(),
            aabb,
        })
    }

    /// Decomposes a concave half-edge mesh into near-convex parts and wraps
    /// them into a concave collider.
    ///
    /// This is the offline pre-processing entry point: the decomposition is
    /// one-shot and the resulting part list is immutable at runtime.
    pub fn decompose(mesh: &HalfEdgeMesh, params: &HacdParameters) -> Result<Self, MeshError> {
        let mut parts = Vec::new();

        for (hull, _) in Hacd::new(*params).compute(mesh) {
            parts.push(ConvexCollider::new(hull)?);
        }

        Self::new(parts)
    }

    /// The convex parts of this collider.
    pub fn parts(&self) -> &[ConvexCollider] {
        &self.parts
    }

    /// The world-space bounding box of the whole collider.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The current world pose.
    pub fn pose(&self) -> &Isometry<Real> {
        &self.pose
    }

    /// Updates the pose of the collider and of every part.
    pub fn set_pose(&mut self, pose: Isometry<Real>) {
        self.pose = pose;
        self.aabb = Aabb::new_invalid();
        for part in &mut self.parts {
            part.set_pose(pose);
            self.aabb = self.aabb.merged(part.aabb());
        }
    }

    /// The convex parts whose bounding box overlaps the given one.
    ///
    /// This is the pruning query the narrow phase uses before recursing into
    /// convex-convex detection.
    pub fn overlapping_parts<'a>(
        &'a self,
        aabb: &'a Aabb,
    ) -> impl Iterator<Item = &'a ConvexCollider> + 'a {
        self.parts.iter().filter(move |p| p.aabb().intersects(aabb))
    }
}

/// A collider of either convexity class.
///
/// The narrow phase dispatches over this closed set by pattern matching;
/// there is no open class hierarchy to downcast from.
#[derive(Debug, Clone)]
pub enum Collider {
    /// A single convex hull.
    Convex(ConvexCollider),
    /// A set of convex parts approximating a concave shape.
    Concave(ConcaveCollider),
}

impl Collider {
    /// The world-space bounding box of this collider.
    pub fn aabb(&self) -> &Aabb {
        match self {
            Collider::Convex(c) => c.aabb(),
            Collider::Concave(c) => c.aabb(),
        }
    }

    /// The current world pose.
    pub fn pose(&self) -> &Isometry<Real> {
        match self {
            Collider::Convex(c) => c.pose(),
            Collider::Concave(c) => c.pose(),
        }
    }

    /// Updates the world pose.
    ///
    /// Poses must be fully updated before collision detection runs; nothing
    /// synchronizes a pose change happening concurrently with a query.
    pub fn set_pose(&mut self, pose: Isometry<Real>) {
        match self {
            Collider::Convex(c) => c.set_pose(pose),
            Collider::Concave(c) => c.set_pose(pose),
        }
    }

    /// This collider as a convex one, if it is convex.
    pub fn as_convex(&self) -> Option<&ConvexCollider> {
        match self {
            Collider::Convex(c) => Some(c),
            Collider::Concave(_) => None,
        }
    }
}
