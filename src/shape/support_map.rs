//! Traits for support mapping based shapes.

use crate::math::{Isometry, Point, Real, Vector};

/// Trait of convex shapes representable by a support mapping function.
///
/// A support function associates a direction with the shape point that
/// maximizes their dot product. Support points are index-tagged so contact
/// points derived from them can be tracked across frames.
pub trait SupportMap {
    /// Evaluates the support function of this shape in its local frame.
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        self.local_support_point_with_id(dir).1
    }

    /// Same as `local_support_point`, additionally returning the index of the
    /// supporting vertex in the shape's geometry.
    fn local_support_point_with_id(&self, dir: &Vector<Real>) -> (usize, Point<Real>);

    /// The world pose of this shape.
    fn pose(&self) -> &Isometry<Real>;

    /// Evaluates the support function along a world-space direction,
    /// returning a world-space point.
    fn support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        self.support_point_with_id(dir).1
    }

    /// Same as `support_point`, additionally returning the index of the
    /// supporting vertex.
    fn support_point_with_id(&self, dir: &Vector<Real>) -> (usize, Point<Real>) {
        let local_dir = self.pose().inverse_transform_vector(dir);
        let (id, local_point) = self.local_support_point_with_id(&local_dir);
        (id, self.pose() * local_point)
    }
}
