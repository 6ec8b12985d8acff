use crate::math::{Point, Real, UnitVector};

/// A single contact point between two colliders.
///
/// Positions are cached both in the local space of each collider (stable
/// under motion, used to refresh and invalidate persisted contacts) and in
/// world space (consumed by the constraint solver).
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// The contact point in the local space of the first collider.
    pub local1: Point<Real>,
    /// The contact point in the local space of the second collider.
    pub local2: Point<Real>,
    /// The contact point on the first collider, in world space.
    pub world1: Point<Real>,
    /// The contact point on the second collider, in world space.
    pub world2: Point<Real>,
    /// The unit separation normal, in world space, pointing from the first
    /// collider toward the second one.
    ///
    /// While penetrating, `world1 - world2 == normal * depth`.
    pub normal: UnitVector<Real>,
    /// The penetration depth along `normal`.
    pub depth: Real,
    /// Index of the geometric feature of the first collider this contact was
    /// generated from. Used to track the contact across frames.
    pub feature1: usize,
    /// Index of the geometric feature of the second collider this contact
    /// was generated from.
    pub feature2: usize,
}

impl Contact {
    /// This contact with the roles of both colliders exchanged.
    pub fn flipped(self) -> Self {
        Contact {
            local1: self.local2,
            local2: self.local1,
            world1: self.world2,
            world2: self.world1,
            normal: -self.normal,
            depth: self.depth,
            feature1: self.feature2,
            feature2: self.feature1,
        }
    }
}
