//! Penetration depth between intersecting shapes by polytope expansion.
//!
//! Starting from the tetrahedron GJK terminated with, the algorithm grows a
//! convex polytope inside the Minkowski difference: at every step the
//! polytope face closest to the origin is pushed outward by a support point
//! along its normal, until the support point stops making measurable
//! progress. The closest face then yields the separation normal, the
//! penetration depth, and the witness points on both shapes.
//!
//! The polytope itself is a [`HalfEdgeMesh`] expanded through the same
//! horizon computation the incremental hull construction uses.

use crate::math::{Point, Real, UnitVector, Vector};
use crate::query::gjk::{Simplex, SupportPoint};
use crate::shape::half_edge_mesh::{self, HalfEdgeMesh, NormalMap};
use crate::shape::SupportMap;
use crate::utils;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Heap entry ordering faces by increasing distance to the origin. Faces
// removed from the polytope stay in the heap and are skipped on pop.
#[derive(Copy, Clone, PartialEq)]
struct FaceKey {
    face: usize,
    neg_dist: Real,
}

impl FaceKey {
    fn new(face: usize, neg_dist: Real, epsilon: Real) -> Option<Self> {
        // A face lying behind the origin means the polytope is corrupt;
        // never consider it for expansion.
        if neg_dist > epsilon {
            None
        } else {
            Some(FaceKey { face, neg_dist })
        }
    }
}

impl Eq for FaceKey {}

impl PartialOrd for FaceKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FaceKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.neg_dist < other.neg_dist {
            Ordering::Less
        } else if self.neg_dist > other.neg_dist {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

// Everything needed to emit a contact from a polytope face, captured before
// the face gets removed by an expansion step.
struct ClosestFace {
    normal: Vector<Real>,
    dist: Real,
    corners: [SupportPoint; 3],
}

/// The result of a penetration query: minimum translation vector plus the
/// witness points it was reconstructed from.
#[derive(Debug, Clone)]
pub struct Penetration {
    /// The unit separation normal, pointing from the first shape toward the
    /// second one.
    pub normal: UnitVector<Real>,
    /// The penetration depth along `normal`.
    pub depth: Real,
    /// The deepest point of the first shape, in world space.
    pub world1: Point<Real>,
    /// The deepest point of the second shape, in world space.
    pub world2: Point<Real>,
    /// Supporting vertex index on the first shape's hull.
    pub feature1: usize,
    /// Supporting vertex index on the second shape's hull.
    pub feature2: usize,
}

/// Penetration-depth detector for pairs already known to intersect.
#[derive(Debug, Clone)]
pub struct EpaDetector {
    /// Minimum progress of the closest-face distance under which the
    /// expansion terminates.
    pub min_face_difference: Real,
    /// Numeric tolerance used for visibility and degeneracy checks.
    pub precision: Real,
    /// Hard cap on the number of expansions; past it the best polytope found
    /// so far is used.
    pub max_iterations: usize,
}

impl EpaDetector {
    /// Creates a detector with the given termination threshold and numeric
    /// tolerance.
    pub fn new(min_face_difference: Real, precision: Real) -> Self {
        EpaDetector {
            min_face_difference,
            precision,
            max_iterations: 100,
        }
    }

    /// Computes the penetration data of two intersecting shapes.
    ///
    /// `simplex` must be the terminal simplex of a successful GJK run on the
    /// same pair, with the same poses. Returns `None` only if the polytope
    /// collapses before any face can be evaluated.
    pub fn penetration<G1, G2>(
        &self,
        g1: &G1,
        g2: &G2,
        simplex: &Simplex,
    ) -> Option<Penetration>
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let points = simplex.points();
        if points.len() < 4 {
            // The shapes touch along a degenerate feature; report a contact
            // with no measurable depth.
            return Some(degenerate_contact(&points[points.len() - 1]));
        }

        let mut corners = [points[0], points[1], points[2], points[3]];
        let d1 = corners[1].point - corners[0].point;
        let d2 = corners[2].point - corners[0].point;
        let d3 = corners[3].point - corners[0].point;
        let volume = d1.cross(&d2).dot(&d3);

        if volume.abs() <= self.precision {
            return Some(degenerate_contact(&points[3]));
        }
        if volume > 0.0 {
            corners.swap(1, 2);
        }

        // Seed the polytope with the (outward-wound) tetrahedron.
        let mut mesh = HalfEdgeMesh::new();
        let mut supports = Vec::with_capacity(16);
        for corner in &corners {
            let _ = mesh.add_vertex(corner.point);
            supports.push(*corner);
        }

        let mut normals = NormalMap::new();
        let mut heap = BinaryHeap::new();
        for pts in [[0, 1, 2], [1, 3, 2], [0, 2, 3], [0, 3, 1]] {
            let face = mesh.add_face(&pts).ok()?;
            let normal = half_edge_mesh::face_normal(&mesh, face);
            if normal == Vector::zeros() {
                return Some(degenerate_contact(&points[3]));
            }

            let dist = normal.dot(&corners[pts[0]].point.coords);
            let _ = normals.insert(face, normal);
            if let Some(key) = FaceKey::new(face, -dist, self.precision) {
                heap.push(key);
            }
        }

        if heap.is_empty() {
            log::debug!("EPA failed to project the origin inside the initial simplex");
            return None;
        }

        let mut best: Option<ClosestFace> = None;
        let mut niter = 0;

        while let Some(key) = heap.pop() {
            if !mesh.contains_face(key.face) {
                // Lazily deleted by an earlier expansion.
                continue;
            }

            let dist = -key.neg_dist;
            let normal = normals[&key.face];
            let face_data = capture_face(&mesh, &supports, key.face, normal, dist);

            let support = SupportPoint::from_shapes(g1, g2, &normal);
            let candidate_dist = support.point.coords.dot(&normal);

            if candidate_dist - dist < self.min_face_difference {
                // The support point no longer pushes the face outward: this
                // face realizes the penetration depth.
                return Some(contact_on_face(&face_data));
            }

            best = Some(face_data);

            let (boundary, visible) = half_edge_mesh::horizon(
                &mesh,
                &normals,
                &support.point,
                key.face,
                self.precision,
            );
            if boundary.is_empty() {
                break;
            }

            // The boundary edges die with their faces; keep their endpoints.
            let rims: Vec<(usize, usize)> = boundary
                .iter()
                .map(|&e| (mesh.edge_source(e), mesh.edge(e).unwrap().vertex))
                .collect();

            for face in visible {
                mesh.remove_face(face);
                let _ = normals.remove(&face);
            }

            let apex = mesh.add_vertex(support.point);
            supports.push(support);

            let mut stuck = false;
            for (a, b) in rims {
                match mesh.add_face(&[a, b, apex]) {
                    Ok(face) => {
                        let normal = half_edge_mesh::face_normal(&mesh, face);
                        if normal == Vector::zeros() {
                            stuck = true;
                            break;
                        }

                        let anchor = mesh.vertex(a).unwrap().position;
                        let dist = normal.dot(&anchor.coords);
                        let _ = normals.insert(face, normal);
                        if let Some(key) = FaceKey::new(face, -dist, self.precision) {
                            heap.push(key);
                        }
                    }
                    Err(_) => {
                        stuck = true;
                        break;
                    }
                }
            }

            if stuck {
                // A degenerate stitch means no further reliable expansion;
                // fall back to the best face found so far.
                break;
            }

            niter += 1;
            if niter > self.max_iterations {
                break;
            }
        }

        best.map(|face| contact_on_face(&face))
    }
}

fn capture_face(
    mesh: &HalfEdgeMesh,
    supports: &[SupportPoint],
    face: usize,
    normal: Vector<Real>,
    dist: Real,
) -> ClosestFace {
    let vertices = mesh.face_vertices(face);
    ClosestFace {
        normal,
        dist,
        corners: [
            supports[vertices[0]],
            supports[vertices[1]],
            supports[vertices[2]],
        ],
    }
}

// Projects the origin on the face and maps the projection back onto both
// shapes through the barycentric coordinates of the face's support points.
fn contact_on_face(face: &ClosestFace) -> Penetration {
    let [a, b, c] = &face.corners;
    let projection = Point::from(face.normal * face.dist);

    let mut weights =
        utils::triangle_barycentric_coordinates(&projection, &a.point, &b.point, &c.point)
            .unwrap_or([1.0 / 3.0; 3]);

    // Numerical noise can push the projection marginally outside the face.
    let mut sum = 0.0;
    for w in &mut weights {
        *w = w.max(0.0);
        sum += *w;
    }
    if sum <= 0.0 {
        weights = [1.0 / 3.0; 3];
        sum = 1.0;
    }

    let world1 = a.world1 * (weights[0] / sum)
        + b.world1.coords * (weights[1] / sum)
        + c.world1.coords * (weights[2] / sum);
    let world2 = a.world2 * (weights[0] / sum)
        + b.world2.coords * (weights[1] / sum)
        + c.world2.coords * (weights[2] / sum);

    let dominant = if weights[0] >= weights[1] && weights[0] >= weights[2] {
        a
    } else if weights[1] >= weights[2] {
        b
    } else {
        c
    };

    Penetration {
        normal: UnitVector::new_normalize(face.normal),
        depth: face.dist,
        world1,
        world2,
        feature1: dominant.feature1,
        feature2: dominant.feature2,
    }
}

fn degenerate_contact(point: &SupportPoint) -> Penetration {
    Penetration {
        normal: Vector::y_axis(),
        depth: 0.0,
        world1: point.world1,
        world2: point.world2,
        feature1: point.feature1,
        feature2: point.feature2,
    }
}
