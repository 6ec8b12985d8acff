//! The Gilbert-Johnson-Keerthi intersection test.
//!
//! GJK walks the Minkowski difference `A ⊖ B` of two convex shapes with
//! support-point queries: two shapes intersect iff the origin lies inside
//! their Minkowski difference. The algorithm evolves a simplex of support
//! points until either the origin is enclosed (intersection) or a support
//! plane separating the origin is found (no intersection).
//!
//! Penetration depth is not computed here; the enclosing simplex is handed
//! over to the EPA for that.

use crate::math::{Real, Vector};
use crate::query::gjk::{Simplex, SimplexState, SupportPoint};
use crate::shape::SupportMap;

/// Intersection detector between two convex support-mapped shapes.
#[derive(Debug, Clone)]
pub struct GjkDetector {
    /// Numeric tolerance below which the origin is considered to lie on a
    /// simplex feature.
    pub epsilon: Real,
    /// Hard cap on the number of support-point iterations. Exceeding it is
    /// reported as "no intersection" rather than as an error.
    pub max_iterations: usize,
}

impl GjkDetector {
    /// Creates a detector with the given numeric tolerance.
    pub fn new(epsilon: Real) -> Self {
        GjkDetector {
            epsilon,
            max_iterations: 100,
        }
    }

    /// Checks whether two convex shapes intersect.
    ///
    /// On intersection, returns the terminal simplex, completed to a full
    /// tetrahedron whenever the geometry allows it, ready to seed the EPA.
    /// Degenerate or non-converging inputs yield `None`.
    pub fn intersection<G1, G2>(&self, g1: &G1, g2: &G2) -> Option<Simplex>
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        // Any starting direction works; the segment between the two poses
        // converges fastest when it is not degenerate.
        let mut dir =
            g2.pose().translation.vector - g1.pose().translation.vector;
        if dir.norm_squared() <= self.epsilon * self.epsilon {
            dir = Vector::x();
        }

        let support = SupportPoint::from_shapes(g1, g2, &dir);
        let mut simplex = Simplex::new(support);
        dir = -support.point.coords;

        for _ in 0..self.max_iterations {
            let dir_norm = dir.norm();
            if dir_norm <= self.epsilon {
                // The origin lies on the current simplex feature.
                self.complete_tetrahedron(g1, g2, &mut simplex);
                return Some(simplex);
            }
            let dir_unit = dir / dir_norm;

            let support = SupportPoint::from_shapes(g1, g2, &dir_unit);
            if support.point.coords.dot(&dir_unit) < self.epsilon {
                // No support point reaches past the origin: the shapes do
                // not intersect.
                return None;
            }

            simplex.push(support);
            match simplex.update(self.epsilon) {
                SimplexState::KeepSearching(new_dir) => dir = new_dir,
                SimplexState::EnclosesOrigin => {
                    self.complete_tetrahedron(g1, g2, &mut simplex);
                    return Some(simplex);
                }
            }
        }

        None
    }

    // Expands a lower-dimensional terminal simplex to a tetrahedron by
    // probing support directions orthogonal to the degenerate feature. Flat
    // shapes can make the expansion impossible; the simplex is then left
    // as-is and the EPA falls back to a zero-depth contact.
    fn complete_tetrahedron<G1, G2>(&self, g1: &G1, g2: &G2, simplex: &mut Simplex)
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let eps = self.epsilon;

        if simplex.dimension() == 0 {
            let a = simplex.points()[0].point;
            for dir in [
                Vector::x(),
                -Vector::x(),
                Vector::y(),
                -Vector::y(),
                Vector::z(),
                -Vector::z(),
            ] {
                let support = SupportPoint::from_shapes(g1, g2, &dir);
                if (support.point - a).norm_squared() > eps * eps {
                    simplex.push(support);
                    break;
                }
            }
        }

        if simplex.dimension() == 1 {
            let a = simplex.points()[0].point;
            let b = simplex.points()[1].point;
            let ab = b - a;

            Vector::orthonormal_subspace_basis(&[ab], |ortho| {
                let support = SupportPoint::from_shapes(g1, g2, ortho);
                if (support.point - a).cross(&ab).norm_squared() > eps * eps {
                    simplex.push(support);
                    return false;
                }
                let support = SupportPoint::from_shapes(g1, g2, &-ortho);
                if (support.point - a).cross(&ab).norm_squared() > eps * eps {
                    simplex.push(support);
                    return false;
                }
                true
            });
        }

        if simplex.dimension() == 2 {
            let a = simplex.points()[0].point;
            let b = simplex.points()[1].point;
            let c = simplex.points()[2].point;
            let normal = (b - a).cross(&(c - a));

            if normal.norm_squared() > eps * eps {
                let above = SupportPoint::from_shapes(g1, g2, &normal);
                let below = SupportPoint::from_shapes(g1, g2, &-normal);
                let dist_above = ((above.point - a).dot(&normal)).abs();
                let dist_below = ((below.point - a).dot(&normal)).abs();

                let best = if dist_above >= dist_below { above } else { below };
                if (best.point - a).dot(&normal).abs() > eps {
                    simplex.push(best);
                }
            }
        }
    }
}
