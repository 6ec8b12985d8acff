use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::half_edge_mesh::{self, HalfEdgeMesh, MeshError, NormalMap};
use crate::shape::SupportMap;

/// A convex collider: a convex hull in half-edge representation together
/// with its current world pose.
///
/// The mesh is immutable once wrapped; only the pose changes at runtime.
/// Scale is expected to be pre-baked into the mesh vertices, the pose only
/// carries the rigid part of the world transform.
#[derive(Debug, Clone)]
pub struct ConvexCollider {
    mesh: HalfEdgeMesh,
    normals: NormalMap,
    local_aabb: Aabb,
    pose: Isometry<Real>,
    aabb: Aabb,
}

impl ConvexCollider {
    /// Wraps a convex half-edge mesh into a collider.
    ///
    /// The mesh must pass the structural [`HalfEdgeMesh::validate`] check and
    /// hold at least one face. Convexity itself is not verified; a concave
    /// mesh silently degrades the support queries to local optima.
    pub fn new(mesh: HalfEdgeMesh) -> Result<Self, MeshError> {
        mesh.validate()?;
        if mesh.face_count() == 0 {
            return Err(MeshError::Empty);
        }

        let normals = half_edge_mesh::compute_normals(&mesh);
        let local_aabb = half_edge_mesh::mesh_aabb(&mesh);

        Ok(ConvexCollider {
            mesh,
            normals,
            local_aabb,
            pose: Isometry::identity(),
            aabb: local_aabb,
        })
    }

    /// The half-edge mesh of this collider's hull, in local space.
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// The local-space normals of the hull faces.
    pub fn normals(&self) -> &NormalMap {
        &self.normals
    }

    /// The world-space axis-aligned bounding box of this collider.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The local-space axis-aligned bounding box of the hull.
    pub fn local_aabb(&self) -> &Aabb {
        &self.local_aabb
    }

    /// The current world pose.
    pub fn pose(&self) -> &Isometry<Real> {
        &self.pose
    }

    /// Updates the world pose of this collider and refreshes its cached
    /// bounding box.
    pub fn set_pose(&mut self, pose: Isometry<Real>) {
        self.pose = pose;
        self.aabb = self.local_aabb.transform_by(&pose);
    }

    /// The world-space position of the hull vertex `i`.
    pub fn world_vertex(&self, i: usize) -> Point<Real> {
        self.pose * self.mesh.vertex(i).unwrap().position
    }

    /// The world-space normal of the hull face `i`.
    pub fn world_face_normal(&self, i: usize) -> Vector<Real> {
        self.pose * self.normals[&i]
    }
}

impl SupportMap for ConvexCollider {
    fn local_support_point_with_id(&self, dir: &Vector<Real>) -> (usize, Point<Real>) {
        // The constructor guarantees a non-empty convex mesh, so the hill
        // climb always lands on a supporting vertex.
        let id = half_edge_mesh::furthest_vertex_toward(&self.mesh, dir).unwrap();
        (id, self.mesh.vertex(id).unwrap().position)
    }

    fn pose(&self) -> &Isometry<Real> {
        &self.pose
    }
}
