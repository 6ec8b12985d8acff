mod common;

use common::{cube_mesh, icosahedron_mesh, l_prism_mesh};
use riposte3d::math::Point;
use riposte3d::shape::half_edge_mesh::{compute_normals, point_on_face};
use riposte3d::shape::{ConcaveCollider, HalfEdgeMesh};
use riposte3d::transformation::hacd::{Hacd, HacdParameters};

fn default_hacd() -> Hacd {
    Hacd::new(HacdParameters::default())
}

// A point is inside a convex hull if it is behind every face plane.
fn hull_contains(mesh: &HalfEdgeMesh, point: &Point<f32>, slack: f32) -> bool {
    let normals = compute_normals(mesh);
    for (face, n) in normals.iter() {
        let e = mesh.face(*face).unwrap().edge;
        let anchor = mesh
            .vertex(mesh.edge(e).unwrap().vertex)
            .unwrap()
            .position;
        if (point - anchor).dot(n) > slack {
            return false;
        }
    }
    true
}

#[test]
fn a_convex_cube_collapses_to_a_single_part() {
    let parts = default_hacd().compute(&cube_mesh(0.5));

    assert_eq!(parts.len(), 1);
    let (hull, normals) = &parts[0];
    hull.validate().unwrap();
    assert_eq!(normals.len(), hull.face_count());

    // The part must still cover the whole cube.
    for corner in [
        Point::new(0.5, 0.5, 0.5),
        Point::new(-0.5, -0.5, -0.5),
        Point::new(0.5, -0.5, 0.5),
    ] {
        assert!(hull_contains(hull, &corner, 1.0e-3));
    }
}

#[test]
fn a_convex_icosahedron_collapses_to_a_single_part() {
    let parts = default_hacd().compute(&icosahedron_mesh());
    assert_eq!(parts.len(), 1);
}

#[test]
fn the_l_prism_splits_into_near_convex_parts() {
    // A tight concavity budget forces a split at the inner corner.
    let hacd = Hacd::new(HacdParameters {
        max_concavity: 0.01,
        epsilon: 1.0e-4,
    });

    let parts = hacd.compute(&l_prism_mesh());
    assert!(parts.len() >= 2, "expected a split, got {}", parts.len());

    // Every original outline vertex is covered by at least one part.
    for p in [
        Point::new(0.0, 0.0, 0.0),
        Point::new(2.0, 0.0, 1.0),
        Point::new(2.0, 1.0, 0.0),
        Point::new(1.0, 1.0, 1.0),
        Point::new(1.0, 2.0, 0.0),
        Point::new(0.0, 2.0, 1.0),
    ] {
        assert!(
            parts.iter().any(|(hull, _)| hull_contains(hull, &p, 1.0e-2)),
            "vertex {p} is not covered by any part"
        );
    }

    // A patch holding both walls of the concave corner can never pass the
    // concavity budget, so at least one of the two inner walls lives in a
    // part of its own and every part is a structurally valid hull.
    for (hull, normals) in &parts {
        hull.validate().unwrap();
        assert_eq!(normals.len(), hull.face_count());
    }
}

#[test]
fn decomposition_terminates_on_every_fixture() {
    for mesh in [cube_mesh(1.0), icosahedron_mesh(), l_prism_mesh()] {
        let parts = default_hacd().compute(&mesh);
        assert!(!parts.is_empty());
    }
}

#[test]
fn every_part_is_a_watertight_convex_mesh() {
    let parts = default_hacd().compute(&l_prism_mesh());

    for (hull, normals) in &parts {
        hull.validate().unwrap();

        // Convexity: every vertex lies behind every face plane.
        for (_, vertex) in hull.iter_vertices() {
            assert!(hull_contains(hull, &vertex.position, 1.0e-3));
        }

        // All normals are unit length and consistent with the faces they
        // describe.
        for (face, n) in normals.iter() {
            approx::assert_relative_eq!(n.norm(), 1.0, epsilon = 1.0e-4);
            let e = hull.face(*face).unwrap().edge;
            let anchor = hull
                .vertex(hull.edge(e).unwrap().vertex)
                .unwrap()
                .position;
            assert!(point_on_face(hull, *face, n, &anchor, 1.0e-3));
        }
    }
}

#[test]
fn decompose_builds_a_usable_concave_collider() {
    let collider = ConcaveCollider::decompose(&l_prism_mesh(), &HacdParameters::default())
        .expect("decomposition failed");

    assert!(!collider.parts().is_empty());

    let aabb = collider.aabb();
    assert!(aabb.mins.x <= 1.0e-3 && aabb.maxs.x >= 2.0 - 1.0e-3);
    assert!(aabb.mins.y <= 1.0e-3 && aabb.maxs.y >= 2.0 - 1.0e-3);
}
