//! Axis Aligned Bounding Box.

use crate::math::{Isometry, Point, Real, Vector};
use num::Bounded;

/// An Axis-Aligned Bounding Box.
///
/// An Aabb is defined by its minimum and maximum corners, with edges always
/// parallel to the coordinate axes. It is the bounding volume exchanged with
/// the broad phase and used to prune the convex parts of concave colliders.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Aabb {
    /// The point with the smallest coordinates of this Aabb.
    pub mins: Point<Real>,
    /// The point with the greatest coordinates of this Aabb.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new Aabb.
    ///
    /// `mins` must be smaller than `maxs` on every coordinate.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid Aabb with `mins` set to `+∞` and `maxs` set to `-∞`.
    ///
    /// Merging points into this Aabb will make it valid; it is the neutral
    /// element of [`Aabb::take_point`].
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::max_value()).into(),
            Vector::repeat(-Real::max_value()).into(),
        )
    }

    /// Computes the Aabb of a set of points.
    pub fn from_points<'a, I>(points: I) -> Aabb
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        let mut result = Aabb::new_invalid();

        for pt in points {
            result.take_point(*pt);
        }

        result
    }

    /// The center of this Aabb.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half extents of this Aabb.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) / 2.0
    }

    /// The extents of this Aabb.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// Enlarges this Aabb so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// The smallest Aabb containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.coords.inf(&other.mins.coords).into(),
            maxs: self.maxs.coords.sup(&other.maxs.coords).into(),
        }
    }

    /// Checks whether this Aabb and `other` overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.mins.x <= other.maxs.x
            && self.mins.y <= other.maxs.y
            && self.mins.z <= other.maxs.z
            && other.mins.x <= self.maxs.x
            && other.mins.y <= self.maxs.y
            && other.mins.z <= self.maxs.z
    }

    /// Checks whether this Aabb contains the point `pt`.
    #[inline]
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        self.mins.x <= pt.x
            && self.mins.y <= pt.y
            && self.mins.z <= pt.z
            && pt.x <= self.maxs.x
            && pt.y <= self.maxs.y
            && pt.z <= self.maxs.z
    }

    /// Computes the Aabb of `self` transformed by `m`.
    ///
    /// The result bounds the rotated box, so it is conservative rather than
    /// tight.
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        let ls_center = self.center();
        let center = m * ls_center;
        let ws_half_extents = m.rotation.to_rotation_matrix().into_inner().abs()
            * self.half_extents();

        Aabb::new(center + (-ws_half_extents), center + ws_half_extents)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Isometry, Point, Vector};
    use approx::assert_relative_eq;

    #[test]
    fn from_points_bounds_all_points() {
        let points = [
            Point::new(1.0, 2.0, 3.0),
            Point::new(-1.0, 4.0, 2.0),
            Point::new(0.0, 0.0, 5.0),
        ];
        let aabb = Aabb::from_points(&points);

        assert_eq!(aabb.mins, Point::new(-1.0, 0.0, 2.0));
        assert_eq!(aabb.maxs, Point::new(1.0, 4.0, 5.0));
    }

    #[test]
    fn transform_by_rotation_stays_conservative() {
        let aabb = Aabb::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0));
        let m = Isometry::new(
            Vector::new(10.0, 0.0, 0.0),
            Vector::y() * core::f32::consts::FRAC_PI_4,
        );
        let transformed = aabb.transform_by(&m);

        assert_relative_eq!(transformed.center(), Point::new(10.0, 0.0, 0.0));
        assert!(transformed.half_extents().x >= 1.0);
        assert!(transformed.half_extents().y >= 1.0 - 1.0e-6);
    }
}
