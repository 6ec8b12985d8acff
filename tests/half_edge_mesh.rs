mod common;

use approx::assert_relative_eq;
use common::{cube_mesh, icosahedron_mesh};
use riposte3d::math::{Point, Real, Vector};
use riposte3d::shape::half_edge_mesh::{
    self, compute_normals, furthest_vertex_toward, horizon, mesh_aabb, raycast_from_inside,
    triangulate_faces,
};
use riposte3d::utils::triangle_area;

#[test]
fn cube_fixture_is_a_valid_manifold() {
    let mesh = cube_mesh(0.5);
    mesh.validate().unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 6);
    // Euler characteristic of a closed genus-0 surface: V - E + F = 2.
    assert_eq!(mesh.iter_edges().count(), 24);
}

#[test]
fn merging_two_cube_faces_keeps_the_first_face_index() {
    let mut mesh = cube_mesh(0.5);

    // Faces 5 (+x) and 3 (+y) share exactly the edge between vertices 2 and 6.
    let merged = mesh.merge_faces(5, 3).unwrap();
    assert_eq!(merged, 5);
    assert!(!mesh.contains_face(3));
    mesh.validate().unwrap();

    // The merged loop is the union of both quads minus the shared edge:
    // six boundary vertices, each appearing once.
    let mut vertices = mesh.face_vertices(merged).into_vec();
    assert_eq!(vertices.len(), 6);
    vertices.sort_unstable();
    vertices.dedup();
    assert_eq!(vertices.len(), 6);
}

#[test]
fn aabb_of_the_cube() {
    let aabb = mesh_aabb(&cube_mesh(1.5));
    assert_eq!(aabb.mins, Point::new(-1.5, -1.5, -1.5));
    assert_eq!(aabb.maxs, Point::new(1.5, 1.5, 1.5));
}

#[test]
fn furthest_vertex_on_the_icosahedron_along_each_vertex_direction() {
    let mesh = icosahedron_mesh();
    mesh.validate().unwrap();

    for (i, vertex) in mesh.iter_vertices() {
        let direction = vertex.position.coords;
        assert_eq!(furthest_vertex_toward(&mesh, &direction), Some(i));
    }
}

#[test]
fn furthest_vertex_on_the_cube_along_a_diagonal() {
    let mesh = cube_mesh(0.5);
    let i = furthest_vertex_toward(&mesh, &Vector::new(1.0, 1.0, 1.0)).unwrap();
    assert_eq!(mesh.vertex(i).unwrap().position, Point::new(0.5, 0.5, 0.5));
}

#[test]
fn horizon_from_a_point_facing_one_cube_face() {
    let mesh = cube_mesh(0.5);
    let normals = compute_normals(&mesh);

    // Directly in front of the +x face (index 5): only that face is
    // visible and its four edges form the horizon.
    let eye = Point::new(3.0, 0.0, 0.0);
    let (boundary, visible) = horizon(&mesh, &normals, &eye, 5, 1.0e-6);

    assert_eq!(visible, vec![5]);
    assert_eq!(boundary.len(), 4);
    for e in boundary {
        assert_eq!(mesh.edge(e).unwrap().face, Some(5));
    }
}

#[test]
fn horizon_from_a_cube_corner_direction() {
    let mesh = cube_mesh(0.5);
    let normals = compute_normals(&mesh);

    // From out beyond the (+x, +y, +z) corner, three faces are visible and
    // the horizon is a six-edge loop.
    let eye = Point::new(2.0, 2.0, 2.0);
    let (boundary, visible) = horizon(&mesh, &normals, &eye, 5, 1.0e-6);

    assert_eq!(visible.len(), 3);
    assert_eq!(boundary.len(), 6);

    // The boundary must be a closed loop: each edge's destination is the
    // next edge's source.
    for (k, &e) in boundary.iter().enumerate() {
        let next = boundary[(k + 1) % boundary.len()];
        assert_eq!(
            mesh.edge(e).unwrap().vertex,
            mesh.edge_source(next),
            "horizon edges are not in loop order"
        );
    }
}

#[test]
fn raycast_from_inside_exits_through_the_expected_face() {
    let mesh = cube_mesh(0.5);
    let normals = compute_normals(&mesh);

    let origin = Point::new(0.1, -0.2, 0.0);
    let direction = Vector::new(1.0, 0.15, -0.1);
    let (face, hit) = raycast_from_inside(&mesh, &normals, &origin, &direction, 1.0e-6).unwrap();

    // The +x face, and the hit lies on its plane, inside the cube bounds.
    assert_eq!(face, 5);
    assert_relative_eq!(hit.x, 0.5, epsilon = 1.0e-5);
    assert!(hit.y.abs() <= 0.5 && hit.z.abs() <= 0.5);

    // The hit is on the ray.
    let t = (hit.x - origin.x) / direction.x;
    assert_relative_eq!(origin.y + t * direction.y, hit.y, epsilon = 1.0e-5);
    assert_relative_eq!(origin.z + t * direction.z, hit.z, epsilon = 1.0e-5);
}

#[test]
fn triangulating_the_cube_preserves_its_surface_area() {
    let mesh = cube_mesh(0.5);
    let (triangulated, face_map) = triangulate_faces(&mesh);
    triangulated.validate().unwrap();

    assert_eq!(triangulated.face_count(), 12);
    assert_eq!(face_map.len(), 12);

    let mut area: Real = 0.0;
    for (i, _) in triangulated.iter_faces() {
        let v = triangulated.face_vertices(i);
        area += triangle_area(
            &triangulated.vertex(v[0]).unwrap().position,
            &triangulated.vertex(v[1]).unwrap().position,
            &triangulated.vertex(v[2]).unwrap().position,
        );
    }
    assert_relative_eq!(area, 6.0, epsilon = 1.0e-5);

    // Triangle normals agree with the quads they came from.
    let quad_normals = compute_normals(&mesh);
    for (new_face, old_face) in face_map {
        let n = half_edge_mesh::face_normal(&triangulated, new_face);
        assert_relative_eq!(n, quad_normals[&old_face], epsilon = 1.0e-5);
    }
}
