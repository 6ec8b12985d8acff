use crate::math::{Point, Real, Vector};
use crate::shape::SupportMap;

/// A point of the Minkowski difference of two shapes.
///
/// Each point of `A ⊖ B` is the difference of two points, one belonging to
/// each shape. The witness points and the indices of the supporting hull
/// vertices are kept around so contacts reconstructed from the difference
/// can be mapped back onto the original shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SupportPoint {
    /// The point on the Minkowski difference, equal to `world1 - world2`.
    pub point: Point<Real>,
    /// The supporting point on the first shape, in world space.
    pub world1: Point<Real>,
    /// The supporting point on the second shape, in world space.
    pub world2: Point<Real>,
    /// The index of the supporting vertex on the first shape's hull.
    pub feature1: usize,
    /// The index of the supporting vertex on the second shape's hull.
    pub feature2: usize,
}

impl SupportPoint {
    /// Computes the support point of the Minkowski difference of `g1` and
    /// `g2` toward the world-space direction `dir`.
    pub fn from_shapes<G1, G2>(g1: &G1, g2: &G2, dir: &Vector<Real>) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let (feature1, world1) = g1.support_point_with_id(dir);
        let (feature2, world2) = g2.support_point_with_id(&-dir);

        SupportPoint {
            point: Point::from(world1 - world2),
            world1,
            world2,
            feature1,
            feature2,
        }
    }
}
