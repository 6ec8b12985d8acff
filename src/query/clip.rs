//! Polygon clipping used for multi-point contact generation.

use crate::math::{Point, Real, Vector};
use smallvec::SmallVec;

/// Clips a polygon against the half-space `dot(p - plane_point, plane_normal) <= 0`.
///
/// One Sutherland-Hodgman step: vertices on the inner side are kept, edges
/// crossing the plane are cut at their intersection point. The polygon must
/// be given in loop order; the output is in loop order too.
pub fn clip_polygon_against_plane(
    polygon: &[Point<Real>],
    plane_point: &Point<Real>,
    plane_normal: &Vector<Real>,
) -> SmallVec<[Point<Real>; 8]> {
    let mut out = SmallVec::new();

    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let current_dist = (current - plane_point).dot(plane_normal);
        let next_dist = (next - plane_point).dot(plane_normal);

        if current_dist <= 0.0 {
            out.push(*current);
        }

        if (current_dist < 0.0) != (next_dist < 0.0) && current_dist != next_dist {
            let t = current_dist / (current_dist - next_dist);
            if t > 0.0 && t < 1.0 {
                out.push(current + (next - current) * t);
            }
        }
    }

    out
}
