//! Shared mesh fixtures.
#![allow(dead_code)] // each test binary uses its own subset of fixtures

use riposte3d::math::{Point, Real};
use riposte3d::shape::HalfEdgeMesh;

/// An axis-aligned cube of the given half extent, centered at the origin,
/// with one quadrilateral face per side.
pub fn cube_mesh(half: Real) -> HalfEdgeMesh {
    cube_mesh_at(half, Point::origin())
}

/// An axis-aligned cube of the given half extent centered at `center`.
pub fn cube_mesh_at(half: Real, center: Point<Real>) -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();

    for (x, y, z) in [
        (-half, -half, -half),
        (half, -half, -half),
        (half, half, -half),
        (-half, half, -half),
        (-half, -half, half),
        (half, -half, half),
        (half, half, half),
        (-half, half, half),
    ] {
        let _ = mesh.add_vertex(center + riposte3d::math::Vector::new(x, y, z));
    }

    for face in [
        [0, 3, 2, 1], // -z
        [4, 5, 6, 7], // +z
        [0, 1, 5, 4], // -y
        [2, 3, 7, 6], // +y
        [0, 4, 7, 3], // -x
        [1, 2, 6, 5], // +x
    ] {
        mesh.add_face(&face).unwrap();
    }

    mesh
}

/// A regular icosahedron centered at the origin.
pub fn icosahedron_mesh() -> HalfEdgeMesh {
    let phi = (1.0 + (5.0 as Real).sqrt()) / 2.0;
    let mut mesh = HalfEdgeMesh::new();

    for (x, y, z) in [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ] {
        let _ = mesh.add_vertex(Point::new(x, y, z));
    }

    for face in [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ] {
        mesh.add_face(&face).unwrap();
    }

    mesh
}

/// A closed L-shaped prism: concave at the inner corner, extruded along z.
pub fn l_prism_mesh() -> HalfEdgeMesh {
    // L cross-section, counter-clockwise as seen from +z. Every vertex of
    // the outline is visible from the first one, so fanning the cap faces
    // from it stays inside the outline.
    let outline = [
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ];

    let mut mesh = HalfEdgeMesh::new();
    let n = outline.len();

    for &(x, y) in &outline {
        let _ = mesh.add_vertex(Point::new(x, y, 0.0));
    }
    for &(x, y) in &outline {
        let _ = mesh.add_vertex(Point::new(x, y, 1.0));
    }

    // Caps, as triangle fans from the corner vertex.
    for i in 1..n - 1 {
        mesh.add_face(&[n + 0, n + i, n + i + 1]).unwrap(); // +z cap
        mesh.add_face(&[0, i + 1, i]).unwrap(); // -z cap
    }

    // Sides.
    for i in 0..n {
        let j = (i + 1) % n;
        mesh.add_face(&[i, j, n + j, n + i]).unwrap();
    }

    mesh
}
