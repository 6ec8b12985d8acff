//! Incremental convex hull construction on half-edge meshes.

use crate::math::{Point, Real, Vector};
use crate::shape::half_edge_mesh::{self, HalfEdgeMesh, NormalMap};
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned by the convex hull computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvexHullError {
    /// Not enough input points to span a hull.
    #[error("at least 3 points are needed to build a convex hull, got {0}")]
    IncompleteInput(usize),
    /// Every input point lies on the same line (or the same spot).
    #[error("the input points are collinear or coincident")]
    Degenerate,
    /// The expansion loop gave up because of accumulated rounding errors.
    #[error("the hull construction did not converge")]
    Unconverged,
}

/// Computes the convex hull of a set of points with the default tolerance.
///
/// See [`convex_hull_with_epsilon`].
pub fn convex_hull(
    points: &[Point<Real>],
) -> Result<(HalfEdgeMesh, NormalMap), ConvexHullError> {
    convex_hull_with_epsilon(points, 1.0e-5)
}

/// Computes the convex hull of a set of points.
///
/// Returns the hull as a half-edge mesh together with its face normals.
/// Coplanar neighbouring faces are merged, so hull faces are convex polygons
/// rather than raw triangles. A planar point set yields a hull with a single
/// polygonal face.
pub fn convex_hull_with_epsilon(
    points: &[Point<Real>],
    epsilon: Real,
) -> Result<(HalfEdgeMesh, NormalMap), ConvexHullError> {
    if points.len() < 3 {
        return Err(ConvexHullError::IncompleteInput(points.len()));
    }

    let [i0, i1, i2] = initial_triangle(points, epsilon)?;

    // Furthest point from the initial triangle's plane decides between the
    // planar and the volumetric path.
    let normal = (points[i1] - points[i0]).cross(&(points[i2] - points[i0]));
    let mut i3 = usize::MAX;
    let mut best = epsilon * normal.norm();
    for (i, p) in points.iter().enumerate() {
        let dist = (p - points[i0]).dot(&normal).abs();
        if dist > best {
            i3 = i;
            best = dist;
        }
    }

    if i3 == usize::MAX {
        planar_hull(points, &normal)
    } else {
        volumetric_hull(points, [i0, i1, i2, i3], epsilon)
    }
}

// The two most distant extreme points along x, plus the point furthest from
// their line.
fn initial_triangle(
    points: &[Point<Real>],
    epsilon: Real,
) -> Result<[usize; 3], ConvexHullError> {
    let mut i0 = 0;
    let mut i1 = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x < points[i0].x {
            i0 = i;
        }
        if p.x > points[i1].x {
            i1 = i;
        }
    }

    if i0 == i1 || (points[i1] - points[i0]).norm() <= epsilon {
        // Degenerate along x; fall back to the most distant pair overall.
        let mut best = epsilon;
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                let dist = (points[j] - points[i]).norm();
                if dist > best {
                    i0 = i;
                    i1 = j;
                    best = dist;
                }
            }
        }
        if best <= epsilon {
            return Err(ConvexHullError::Degenerate);
        }
    }

    let axis = points[i1] - points[i0];
    let mut i2 = usize::MAX;
    let mut best = epsilon * axis.norm();
    for (i, p) in points.iter().enumerate() {
        let dist = (p - points[i0]).cross(&axis).norm();
        if dist > best {
            i2 = i;
            best = dist;
        }
    }

    if i2 == usize::MAX {
        return Err(ConvexHullError::Degenerate);
    }

    Ok([i0, i1, i2])
}

// 2D hull of a planar point set, as a single-face mesh. The face winding
// follows the monotone-chain orientation in the projection basis.
fn planar_hull(
    points: &[Point<Real>],
    normal: &Vector<Real>,
) -> Result<(HalfEdgeMesh, NormalMap), ConvexHullError> {
    let mut basis = [Vector::zeros(); 2];
    let mut nbasis = 0;
    Vector::orthonormal_subspace_basis(&[*normal], |b| {
        basis[nbasis] = *b;
        nbasis += 1;
        nbasis < 2
    });
    if nbasis < 2 {
        return Err(ConvexHullError::Degenerate);
    }

    let projected: Vec<(Real, Real)> = points
        .iter()
        .map(|p| (p.coords.dot(&basis[0]), p.coords.dot(&basis[1])))
        .collect();

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        projected[a]
            .0
            .total_cmp(&projected[b].0)
            .then(projected[a].1.total_cmp(&projected[b].1))
    });

    let cross = |o: usize, a: usize, b: usize| -> Real {
        let (ox, oy) = projected[o];
        let (ax, ay) = projected[a];
        let (bx, by) = projected[b];
        (ax - ox) * (by - oy) - (ay - oy) * (bx - ox)
    };

    let mut lower: Vec<usize> = Vec::new();
    for &i in &order {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], i) <= 0.0
        {
            let _ = lower.pop();
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::new();
    for &i in order.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], i) <= 0.0
        {
            let _ = upper.pop();
        }
        upper.push(i);
    }

    let _ = lower.pop();
    let _ = upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(ConvexHullError::Degenerate);
    }

    let mut mesh = HalfEdgeMesh::new();
    let loop_vertices: Vec<usize> = lower
        .iter()
        .map(|&i| mesh.add_vertex(points[i]))
        .collect();
    let face = mesh
        .add_face(&loop_vertices)
        .map_err(|_| ConvexHullError::Degenerate)?;

    let mut normals = NormalMap::new();
    let _ = normals.insert(face, half_edge_mesh::face_normal(&mesh, face));

    Ok((mesh, normals))
}

fn volumetric_hull(
    points: &[Point<Real>],
    seed: [usize; 4],
    epsilon: Real,
) -> Result<(HalfEdgeMesh, NormalMap), ConvexHullError> {
    let mut scratch = HalfEdgeMesh::new();
    for p in points {
        let _ = scratch.add_vertex(*p);
    }

    // Wind the seed tetrahedron outward.
    let [a, mut b, mut c, d] = seed;
    let d1 = points[b] - points[a];
    let d2 = points[c] - points[a];
    let d3 = points[d] - points[a];
    if d1.cross(&d2).dot(&d3) > 0.0 {
        core::mem::swap(&mut b, &mut c);
    }

    let mut normals = NormalMap::new();
    // Conflict lists: the input points each face can still see.
    let mut conflicts: HashMap<usize, Vec<usize>> = HashMap::new();

    let seed_faces = [[a, b, c], [b, d, c], [a, c, d], [a, d, b]];
    let mut faces = Vec::new();
    for pts in seed_faces {
        let face = scratch
            .add_face(&pts)
            .map_err(|_| ConvexHullError::Degenerate)?;
        let _ = normals.insert(face, half_edge_mesh::face_normal(&scratch, face));
        faces.push(face);
    }

    for (i, p) in points.iter().enumerate() {
        if i == a || i == b || i == c || i == d {
            continue;
        }
        for &face in &faces {
            if face_distance(&scratch, &normals, face, p) > epsilon {
                conflicts.entry(face).or_default().push(i);
                break;
            }
        }
    }

    let mut budget = 8 * points.len() + 64;

    loop {
        // Deterministic pick: the live face with the lowest index that still
        // sees unprocessed points.
        let Some((face, &furthest)) = normals.iter().find_map(|(&face, _)| {
            let list = conflicts.get(&face)?;
            let furthest = list.iter().max_by(|&&i, &&j| {
                face_distance(&scratch, &normals, face, &points[i])
                    .total_cmp(&face_distance(&scratch, &normals, face, &points[j]))
            })?;
            Some((face, furthest))
        }) else {
            break;
        };

        budget = budget.saturating_sub(1);
        if budget == 0 {
            return Err(ConvexHullError::Unconverged);
        }

        let eye = points[furthest];
        let (boundary, visible) =
            half_edge_mesh::horizon(&scratch, &normals, &eye, face, epsilon);
        if boundary.is_empty() {
            return Err(ConvexHullError::Unconverged);
        }

        let rims: Vec<(usize, usize)> = boundary
            .iter()
            .map(|&e| (scratch.edge_source(e), scratch.edge(e).unwrap().vertex))
            .collect();

        let mut orphans = Vec::new();
        for f in visible {
            scratch.remove_face(f);
            let _ = normals.remove(&f);
            if let Some(mut list) = conflicts.remove(&f) {
                orphans.append(&mut list);
            }
        }

        let mut new_faces = Vec::with_capacity(rims.len());
        for (from, to) in rims {
            let new_face = scratch
                .add_face(&[from, to, furthest])
                .map_err(|_| ConvexHullError::Unconverged)?;
            let _ = normals.insert(new_face, half_edge_mesh::face_normal(&scratch, new_face));
            new_faces.push(new_face);
        }

        for orphan in orphans {
            if orphan == furthest {
                continue;
            }
            for &new_face in &new_faces {
                if face_distance(&scratch, &normals, new_face, &points[orphan]) > epsilon {
                    conflicts.entry(new_face).or_default().push(orphan);
                    break;
                }
            }
            // Orphans seeing no new face fell inside the hull.
        }
    }

    merge_coplanar_faces(&mut scratch, &mut normals, epsilon);

    Ok(compact_mesh(&scratch))
}

fn face_distance(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    face: usize,
    point: &Point<Real>,
) -> Real {
    let e = mesh.face(face).unwrap().edge;
    let anchor = mesh.vertex(mesh.edge(e).unwrap().vertex).unwrap().position;
    (point - anchor).dot(&normals[&face])
}

// Folds neighbouring faces with matching normals into single polygonal
// faces. Pairs sharing more than one edge are left alone.
fn merge_coplanar_faces(mesh: &mut HalfEdgeMesh, normals: &mut NormalMap, epsilon: Real) {
    let mut rejected = std::collections::HashSet::new();

    loop {
        let mut mergeable = None;

        'outer: for (face, _) in mesh.iter_faces() {
            for e in mesh.face_edges(face) {
                let opposite = mesh.edge(e).unwrap().opposite;
                if let Some(neighbor) = mesh.edge(opposite).unwrap().face {
                    if neighbor > face
                        && !rejected.contains(&(face, neighbor))
                        && normals[&face].dot(&normals[&neighbor]) > 1.0 - epsilon
                    {
                        mergeable = Some((face, neighbor));
                        break 'outer;
                    }
                }
            }
        }

        let Some((face, neighbor)) = mergeable else {
            return;
        };

        match mesh.merge_faces(face, neighbor) {
            Ok(surviving) => {
                let _ = normals.remove(&neighbor);
                let _ = normals.insert(surviving, half_edge_mesh::face_normal(mesh, surviving));
            }
            Err(_) => {
                // The pair shares more than one edge; leave those two faces
                // as they are.
                let _ = rejected.insert((face, neighbor));
            }
        }
    }
}

// Rebuilds the hull into a fresh mesh holding only the vertices actually
// referenced by faces.
fn compact_mesh(scratch: &HalfEdgeMesh) -> (HalfEdgeMesh, NormalMap) {
    let mut used: Vec<usize> = scratch
        .iter_faces()
        .flat_map(|(f, _)| scratch.face_vertices(f))
        .collect();
    used.sort_unstable();
    used.dedup();

    let mut mesh = HalfEdgeMesh::new();
    let mut remap = HashMap::new();
    for old in used {
        let new = mesh.add_vertex(scratch.vertex(old).unwrap().position);
        let _ = remap.insert(old, new);
    }

    for (f, _) in scratch.iter_faces() {
        let loop_vertices: Vec<usize> = scratch
            .face_vertices(f)
            .iter()
            .map(|v| remap[v])
            .collect();
        match mesh.add_face(&loop_vertices) {
            Ok(_) => {}
            Err(err) => log::debug!("dropping hull face during compaction: {err}"),
        }
    }

    let normals = half_edge_mesh::compute_normals(&mesh);
    (mesh, normals)
}
