use crate::math::{Point, Real};

/// Computes the area of the triangle `(a, b, c)`.
#[inline]
pub fn triangle_area(a: &Point<Real>, b: &Point<Real>, c: &Point<Real>) -> Real {
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Computes the barycentric coordinates of `p` with respect to the triangle
/// `(a, b, c)`.
///
/// The point is assumed to lie on the triangle's plane. Returns `None` if the
/// triangle is degenerate.
pub fn triangle_barycentric_coordinates(
    p: &Point<Real>,
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
) -> Option<[Real; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;

    if denom.abs() <= crate::math::DEFAULT_EPSILON {
        return None;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some([1.0 - v - w, v, w])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;
    use approx::assert_relative_eq;

    #[test]
    fn barycentric_coordinates_of_vertices() {
        let a = Point::origin();
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);

        let bcoords = triangle_barycentric_coordinates(&a, &a, &b, &c).unwrap();
        assert_relative_eq!(bcoords[0], 1.0, epsilon = 1.0e-6);

        let center = Point::new(1.0 / 3.0, 1.0 / 3.0, 0.0);
        let bcoords = triangle_barycentric_coordinates(&center, &a, &b, &c).unwrap();
        for c in bcoords {
            assert_relative_eq!(c, 1.0 / 3.0, epsilon = 1.0e-6);
        }
    }
}
