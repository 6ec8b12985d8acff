use crate::math::{Real, Vector};
use crate::query::gjk::SupportPoint;
use arrayvec::ArrayVec;

/// Outcome of one simplex reduction step.
#[derive(Debug, Clone, PartialEq)]
pub enum SimplexState {
    /// The origin is not enclosed yet; search for the next support point in
    /// the returned direction (not normalized).
    KeepSearching(Vector<Real>),
    /// The simplex encloses (or touches) the origin: the shapes intersect.
    EnclosesOrigin,
}

/// A simplex of 1 to 4 support points of a Minkowski difference.
///
/// The last point is always the most recently added one. Each call to
/// [`Simplex::update`] reduces the simplex to the lowest-dimensional feature
/// closest to the origin and reports the next search direction, one handler
/// per simplex dimension.
#[derive(Debug, Clone)]
pub struct Simplex {
    points: ArrayVec<SupportPoint, 4>,
}

impl Simplex {
    /// Creates a simplex from its first support point.
    pub fn new(point: SupportPoint) -> Self {
        let mut points = ArrayVec::new();
        points.push(point);
        Simplex { points }
    }

    /// Adds a support point; it becomes the newest point of the simplex.
    pub fn push(&mut self, point: SupportPoint) {
        self.points.push(point);
    }

    /// The dimension of the simplex: number of points minus one.
    pub fn dimension(&self) -> usize {
        self.points.len() - 1
    }

    /// The support points, oldest first.
    pub fn points(&self) -> &[SupportPoint] {
        &self.points
    }

    /// Reduces the simplex to the feature closest to the origin.
    pub fn update(&mut self, epsilon: Real) -> SimplexState {
        match self.points.len() {
            1 => self.update_point(epsilon),
            2 => self.update_line(epsilon),
            3 => self.update_triangle(epsilon),
            4 => self.update_tetrahedron(epsilon),
            _ => unreachable!(),
        }
    }

    fn set_points(&mut self, points: &[SupportPoint]) {
        self.points.clear();
        self.points.try_extend_from_slice(points).unwrap();
    }

    fn update_point(&mut self, epsilon: Real) -> SimplexState {
        let a = self.points[0].point.coords;

        if a.norm_squared() <= epsilon * epsilon {
            SimplexState::EnclosesOrigin
        } else {
            SimplexState::KeepSearching(-a)
        }
    }

    fn update_line(&mut self, epsilon: Real) -> SimplexState {
        let a = self.points[1].point.coords;
        let b = self.points[0].point.coords;
        let ab = b - a;
        let ao = -a;

        if ab.dot(&ao) > 0.0 {
            let dir = ab.cross(&ao).cross(&ab);
            if dir.norm_squared() <= epsilon * epsilon {
                // The origin lies on the segment.
                return SimplexState::EnclosesOrigin;
            }
            SimplexState::KeepSearching(dir)
        } else {
            // The newest point alone is the closest feature.
            let newest = self.points[1];
            self.set_points(&[newest]);
            self.update(epsilon)
        }
    }

    fn update_triangle(&mut self, epsilon: Real) -> SimplexState {
        let c = self.points[0];
        let b = self.points[1];
        let a = self.points[2];

        let ap = a.point.coords;
        let ab = b.point.coords - ap;
        let ac = c.point.coords - ap;
        let ao = -ap;
        let abc = ab.cross(&ac);

        if abc.cross(&ac).dot(&ao) > 0.0 {
            if ac.dot(&ao) > 0.0 {
                // Closest to the edge AC.
                self.set_points(&[c, a]);
                let dir = ac.cross(&ao).cross(&ac);
                if dir.norm_squared() <= epsilon * epsilon {
                    return SimplexState::EnclosesOrigin;
                }
                return SimplexState::KeepSearching(dir);
            }

            // Star case: either the edge AB or the vertex A.
            self.set_points(&[b, a]);
            return self.update(epsilon);
        }

        if ab.cross(&abc).dot(&ao) > 0.0 {
            self.set_points(&[b, a]);
            return self.update(epsilon);
        }

        let dist = abc.dot(&ao);

        if dist > epsilon {
            SimplexState::KeepSearching(abc)
        } else if dist < -epsilon {
            // Below the triangle: flip the winding so the normal keeps
            // pointing toward the origin.
            self.set_points(&[b, c, a]);
            SimplexState::KeepSearching(-abc)
        } else {
            // The origin lies on the triangle itself.
            SimplexState::EnclosesOrigin
        }
    }

    fn update_tetrahedron(&mut self, epsilon: Real) -> SimplexState {
        let d = self.points[0];
        let c = self.points[1];
        let b = self.points[2];
        let a = self.points[3];

        let ap = a.point.coords;
        let ab = b.point.coords - ap;
        let ac = c.point.coords - ap;
        let ad = d.point.coords - ap;
        let ao = -ap;

        // Outward normals of the three faces sharing the newest point. The
        // face BCD cannot see the origin: the search direction that produced
        // A guarantees the origin lies on A's side of it.
        let mut abc = ab.cross(&ac);
        if abc.dot(&ad) > 0.0 {
            abc = -abc;
        }
        let mut acd = ac.cross(&ad);
        if acd.dot(&ab) > 0.0 {
            acd = -acd;
        }
        let mut adb = ad.cross(&ab);
        if adb.dot(&ac) > 0.0 {
            adb = -adb;
        }

        if abc.dot(&ao) > epsilon {
            self.set_points(&[c, b, a]);
            return self.update(epsilon);
        }

        if acd.dot(&ao) > epsilon {
            self.set_points(&[d, c, a]);
            return self.update(epsilon);
        }

        if adb.dot(&ao) > epsilon {
            self.set_points(&[b, d, a]);
            return self.update(epsilon);
        }

        SimplexState::EnclosesOrigin
    }
}
