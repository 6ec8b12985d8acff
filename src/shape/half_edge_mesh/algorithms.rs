//! Pure geometric algorithms over [`HalfEdgeMesh`].

use super::{HalfEdgeMesh, NormalMap};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::utils;
use std::collections::HashSet;

/// Computes the unit normal of a face using Newell's method.
///
/// Returns a zero vector for degenerate (zero-area) faces.
pub fn face_normal(mesh: &HalfEdgeMesh, face: usize) -> Vector<Real> {
    let mut normal = Vector::zeros();
    let vertices = mesh.face_vertices(face);

    for (i, &a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let p = mesh.vertex(a).unwrap().position;
        let q = mesh.vertex(b).unwrap().position;

        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }

    normal.try_normalize(crate::math::DEFAULT_EPSILON).unwrap_or_else(Vector::zeros)
}

/// Computes the normals of every face of the mesh.
pub fn compute_normals(mesh: &HalfEdgeMesh) -> NormalMap {
    mesh.iter_faces()
        .map(|(i, _)| (i, face_normal(mesh, i)))
        .collect()
}

/// Computes the normal of the mesh surface at the given vertex.
///
/// The result is the plain sum of the normals of the faces sharing the
/// vertex, without any normalization; callers normalize when they need to.
pub fn vertex_normal(mesh: &HalfEdgeMesh, normals: &NormalMap, vertex: usize) -> Vector<Real> {
    let mut sum = Vector::zeros();

    for (i, edge) in mesh.iter_edges() {
        if mesh.edge_source(i) == vertex {
            if let Some(face) = edge.face {
                if let Some(n) = normals.get(&face) {
                    sum += n;
                }
            }
        }
    }

    sum
}

/// Computes the axis-aligned bounding box of the mesh's active vertices.
pub fn mesh_aabb(mesh: &HalfEdgeMesh) -> Aabb {
    Aabb::from_points(mesh.iter_vertices().map(|(_, v)| &v.position))
}

// The vertices adjacent to `vertex`, walking the edge fan both ways so
// boundary vertices of open surfaces see their whole neighbourhood.
fn vertex_neighbors(mesh: &HalfEdgeMesh, vertex: usize) -> smallvec::SmallVec<[usize; 12]> {
    let mut out = smallvec::SmallVec::new();
    let Some(start) = mesh.vertex(vertex).unwrap().edge else {
        return out;
    };

    let mut e = start;
    loop {
        out.push(mesh.edge(e).unwrap().vertex);
        let opposite = mesh.edge(e).unwrap().opposite;
        if mesh.edge(opposite).unwrap().face.is_none() {
            break;
        }
        e = mesh.edge(opposite).unwrap().next;
        if e == start {
            // Closed fan: every neighbor reached in one sweep.
            return out;
        }
    }

    // A boundary interrupted the sweep; walk the other way around.
    let mut e = start;
    while mesh.edge(e).unwrap().face.is_some() {
        let prev = mesh.prev_in_face(e);
        out.push(mesh.edge_source(prev));
        e = mesh.edge(prev).unwrap().opposite;
    }

    out
}

/// Finds the vertex of a convex mesh furthest in the given direction by
/// hill climbing along the vertex adjacency.
///
/// Returns `None` on an empty mesh. The mesh must be convex: on a concave
/// mesh the climb can stop at a local optimum.
pub fn furthest_vertex_toward(mesh: &HalfEdgeMesh, direction: &Vector<Real>) -> Option<usize> {
    let (mut best, vertex) = mesh.iter_vertices().find(|(_, v)| v.edge.is_some())?;
    let mut best_dot = vertex.position.coords.dot(direction);

    loop {
        let mut improved = false;

        for neighbor in vertex_neighbors(mesh, best) {
            let dot = mesh.vertex(neighbor).unwrap().position.coords.dot(direction);
            if dot > best_dot {
                best = neighbor;
                best_dot = dot;
                improved = true;
                break;
            }
        }

        if !improved {
            return Some(best);
        }
    }
}

// A face sees a point if the point lies strictly on the outer side of the
// face's plane.
fn face_sees_point(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    face: usize,
    point: &Point<Real>,
    epsilon: Real,
) -> bool {
    let e = mesh.face(face).unwrap().edge;
    let p = mesh.vertex(mesh.edge(e).unwrap().vertex).unwrap().position;
    match normals.get(&face) {
        Some(n) => (point - p).dot(n) > epsilon,
        None => false,
    }
}

/// Computes the horizon of the mesh as seen from `eye`.
///
/// Starting from `start_face`, which must be visible from the eye point,
/// faces are classified by the sign of the eye point's distance to their
/// plane. Returns the loop of half-edges separating the visible region from
/// the invisible one (each returned edge belongs to a visible face) together
/// with the list of visible faces, in discovery order.
pub fn horizon(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    eye: &Point<Real>,
    start_face: usize,
    epsilon: Real,
) -> (Vec<usize>, Vec<usize>) {
    let mut visible = vec![start_face];
    let mut visible_set: HashSet<usize> = visible.iter().copied().collect();
    let mut boundary = Vec::new();

    let loop_edges: Vec<usize> = mesh.face_edges(start_face).collect();
    for e in loop_edges {
        cross_edge(
            mesh,
            normals,
            eye,
            e,
            epsilon,
            &mut visible,
            &mut visible_set,
            &mut boundary,
        );
    }

    (boundary, visible)
}

fn cross_edge(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    eye: &Point<Real>,
    e: usize,
    epsilon: Real,
    visible: &mut Vec<usize>,
    visible_set: &mut HashSet<usize>,
    boundary: &mut Vec<usize>,
) {
    let opposite = mesh.edge(e).unwrap().opposite;

    match mesh.edge(opposite).unwrap().face {
        // A surface boundary always belongs to the horizon.
        None => boundary.push(e),
        Some(neighbor) => {
            if visible_set.contains(&neighbor) {
                return;
            }

            if face_sees_point(mesh, normals, neighbor, eye, epsilon) {
                let _ = visible_set.insert(neighbor);
                visible.push(neighbor);

                // Walk the neighbor's loop starting right after the edge we
                // crossed, so the boundary comes out in loop order.
                let mut current = mesh.edge(opposite).unwrap().next;
                while current != opposite {
                    cross_edge(
                        mesh, normals, eye, current, epsilon, visible, visible_set, boundary,
                    );
                    current = mesh.edge(current).unwrap().next;
                }
            } else {
                boundary.push(e);
            }
        }
    }
}

/// Checks that a point lying on a face's plane is enclosed by the face's
/// edge loop ("left of every bounding edge" with an `epsilon` tolerance).
pub fn point_on_face(
    mesh: &HalfEdgeMesh,
    face: usize,
    face_normal: &Vector<Real>,
    point: &Point<Real>,
    epsilon: Real,
) -> bool {
    for e in mesh.face_edges(face) {
        let p1 = mesh.vertex(mesh.edge_source(e)).unwrap().position;
        let p2 = mesh.vertex(mesh.edge(e).unwrap().vertex).unwrap().position;

        if (p2 - p1).cross(face_normal).dot(&(point - p1)) > epsilon {
            return false;
        }
    }

    true
}

/// Computes the exit intersection of a ray starting inside a convex mesh.
///
/// `origin` must lie strictly inside the mesh. Returns the index of the
/// intersected face and the intersection point, or `None` if no face is hit
/// (which only happens on malformed input).
pub fn raycast_from_inside(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    origin: &Point<Real>,
    direction: &Vector<Real>,
    epsilon: Real,
) -> Option<(usize, Point<Real>)> {
    for (i, face) in mesh.iter_faces() {
        let Some(normal) = normals.get(&i) else {
            continue;
        };
        let face_point = mesh.vertex(mesh.edge(face.edge).unwrap().vertex).unwrap().position;

        if let Some(hit) =
            utils::ray_plane_intersection(origin, direction, &face_point, normal, epsilon)
        {
            if point_on_face(mesh, i, normal, &hit, epsilon) {
                return Some((i, hit));
            }
        }
    }

    None
}

/// Creates a new mesh with every polygonal face converted to triangles.
///
/// Faces are assumed convex (they are if they were built through
/// [`HalfEdgeMesh::add_face`] on a hull), so clipping successive ears
/// amounts to a fan from the first loop vertex. Returns the triangulated
/// mesh and the mapping from each new face to the face it originated from.
pub fn triangulate_faces(mesh: &HalfEdgeMesh) -> (HalfEdgeMesh, Vec<(usize, usize)>) {
    let mut out = HalfEdgeMesh::new();
    let mut vertex_map = std::collections::HashMap::new();

    for (i, v) in mesh.iter_vertices() {
        let _ = vertex_map.insert(i, out.add_vertex(v.position));
    }

    let mut face_map = Vec::new();
    for (i, _) in mesh.iter_faces() {
        let loop_vertices = mesh.face_vertices(i);
        for j in 1..loop_vertices.len() - 1 {
            let triangle = [
                vertex_map[&loop_vertices[0]],
                vertex_map[&loop_vertices[j]],
                vertex_map[&loop_vertices[j + 1]],
            ];
            match out.add_face(&triangle) {
                Ok(new_face) => face_map.push((new_face, i)),
                Err(err) => log::debug!("skipping degenerate ear while triangulating: {err}"),
            }
        }
    }

    (out, face_map)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;
    use approx::assert_relative_eq;

    #[test]
    fn face_normal_of_a_triangle() {
        let mut mesh = HalfEdgeMesh::new();
        let _ = mesh.add_vertex(Point::new(1.25, 1.0, -2.75));
        let _ = mesh.add_vertex(Point::new(1.25, -1.0, -2.75));
        let _ = mesh.add_vertex(Point::new(-0.25, -1.0, -2.75));
        let f = mesh.add_face(&[0, 1, 2]).unwrap();

        let normal = face_normal(&mesh, f);
        assert_relative_eq!(normal, Vector::new(0.0, 0.0, -1.0), epsilon = 1.0e-6);
    }

    #[test]
    fn face_normal_of_a_skewed_quad() {
        let mut mesh = HalfEdgeMesh::new();
        let _ = mesh.add_vertex(Point::new(0.117263972, 0.704151272, -3.100874185));
        let _ = mesh.add_vertex(Point::new(0.965986073, -0.263351202, -0.244983732));
        let _ = mesh.add_vertex(Point::new(0.965986073, -2.136411190, 1.768507480));
        let _ = mesh.add_vertex(Point::new(0.117263972, -3.041968584, 0.926108181));
        let f = mesh.add_face(&[0, 1, 2, 3]).unwrap();

        let normal = face_normal(&mesh, f);
        assert_relative_eq!(
            normal,
            Vector::new(0.824532389, -0.414277464, -0.385383605),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn triangulation_preserves_area() {
        let mut mesh = HalfEdgeMesh::new();
        // A regular hexagon in the XZ plane.
        for i in 0..6 {
            let angle = i as Real * std::f32::consts::FRAC_PI_3;
            let _ = mesh.add_vertex(Point::new(angle.cos(), 0.0, angle.sin()));
        }
        let _ = mesh.add_face(&[0, 1, 2, 3, 4, 5]).unwrap();

        let (triangulated, face_map) = triangulate_faces(&mesh);
        assert_eq!(triangulated.face_count(), 4);
        assert_eq!(face_map.len(), 4);

        let mut area = 0.0;
        for (i, _) in triangulated.iter_faces() {
            let v = triangulated.face_vertices(i);
            area += utils::triangle_area(
                &triangulated.vertex(v[0]).unwrap().position,
                &triangulated.vertex(v[1]).unwrap().position,
                &triangulated.vertex(v[2]).unwrap().position,
            );
        }

        // Area of a regular hexagon with unit circumradius.
        let expected = 3.0 * (3.0 as Real).sqrt() / 2.0;
        assert_relative_eq!(area, expected, epsilon = 1.0e-5);
    }

    #[test]
    fn vertex_normal_sums_incident_faces() {
        let mut mesh = HalfEdgeMesh::new();
        let apex = mesh.add_vertex(Point::new(0.0, 1.0, 0.0));
        let a = mesh.add_vertex(Point::new(-1.0, 0.0, -1.0));
        let b = mesh.add_vertex(Point::new(1.0, 0.0, -1.0));
        let c = mesh.add_vertex(Point::new(0.0, 0.0, 1.0));
        let _ = mesh.add_face(&[apex, b, a]).unwrap();
        let _ = mesh.add_face(&[apex, c, b]).unwrap();
        let _ = mesh.add_face(&[apex, a, c]).unwrap();

        let normals = compute_normals(&mesh);
        let n = vertex_normal(&mesh, &normals, apex);

        // The base triangle is symmetric about the x = 0 plane, so the
        // lateral components cancel while the upward ones add up.
        assert_relative_eq!(n.x, 0.0, epsilon = 1.0e-6);
        assert!(n.y > 1.0);
    }
}
