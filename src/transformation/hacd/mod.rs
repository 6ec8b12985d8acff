//! Hierarchical approximate convex decomposition.
//!
//! The decomposition works on the dual graph of a triangulated mesh: every
//! triangle is a graph vertex, every pair of adjacent triangles a graph
//! edge. Edges are repeatedly collapsed in order of increasing cost, where
//! the cost of a collapse combines how concave the merged surface patch
//! would be with how stretched-out its outline is. When no collapse below
//! the concavity budget remains, the surviving patches are closed into
//! convex hulls: the convex parts approximating the original concave mesh.

pub use self::dual_graph::{DualGraph, DualGraphVertex};

mod dual_graph;

use crate::math::{Point, Real};
use crate::shape::half_edge_mesh::{self, HalfEdgeMesh, NormalMap};
use crate::transformation::convex_hull_with_epsilon;
use crate::utils;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Tuning parameters of the decomposition.
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HacdParameters {
    /// The concavity below which two surface patches may still be merged,
    /// before normalization by the mesh size. Lower values produce more,
    /// tighter parts.
    pub max_concavity: Real,
    /// The geometric tolerance, scaled internally by the mesh size.
    pub epsilon: Real,
}

impl Default for HacdParameters {
    fn default() -> Self {
        HacdParameters {
            max_concavity: 0.1,
            epsilon: 1.0e-4,
        }
    }
}

// A dual-graph edge queued for collapse. Entries are invalidated lazily:
// each one remembers the version its endpoints had when it was computed, and
// collapsing a vertex bumps its version.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    v1: usize,
    v2: usize,
    cost: Real,
    concavity: Real,
    version1: u32,
    version2: u32,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Inverted: the binary heap pops its maximum, and the collapse loop
    // wants the candidate with the lowest cost first.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.cost < other.cost {
            Ordering::Greater
        } else if self.cost > other.cost {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

/// The Hierarchical Approximate Convex Decomposition algorithm.
///
/// One-shot and offline: feed a concave [`HalfEdgeMesh`] to
/// [`Hacd::compute`] and get back the convex hulls of the near-convex
/// surface patches it was split into.
#[derive(Debug, Clone, Default)]
pub struct Hacd {
    params: HacdParameters,
}

impl Hacd {
    /// Creates a decomposition with the given parameters.
    pub fn new(params: HacdParameters) -> Self {
        Hacd { params }
    }

    /// Decomposes a mesh into near-convex parts.
    ///
    /// Returns the convex hull of every resulting part with its face
    /// normals. An already-convex input collapses into a single part.
    /// Degenerate patches (zero area, no volume) are treated as perfectly
    /// convex and merged eagerly.
    pub fn compute(&self, mesh: &HalfEdgeMesh) -> Vec<(HalfEdgeMesh, NormalMap)> {
        let (tri_mesh, _) = half_edge_mesh::triangulate_faces(mesh);
        let normals = half_edge_mesh::compute_normals(&tri_mesh);
        let mut graph = DualGraph::from_mesh(&tri_mesh);

        if graph.is_empty() {
            return Vec::new();
        }

        let aabb = half_edge_mesh::mesh_aabb(&tri_mesh);
        let factor = (aabb.maxs - aabb.mins).norm();
        if factor <= 0.0 {
            return Vec::new();
        }

        let scaled_epsilon = factor * self.params.epsilon;
        let aspect_ratio_factor = self.params.max_concavity / (10.0 * factor);
        let threshold = self.params.max_concavity * factor;

        let face_upper_bound = tri_mesh.iter_faces().map(|(i, _)| i + 1).max().unwrap_or(0);
        let mut versions = vec![0u32; face_upper_bound];

        // Queue every graph edge once, ordered by collapse cost.
        let mut heap = BinaryHeap::new();
        for i in 0..graph.vertices.len() {
            let id = graph.vertices[i].id;
            let neighbours = graph.vertices[i].neighbours.clone();
            for n in neighbours {
                if n > id {
                    heap.push(self.candidate(
                        &tri_mesh,
                        &normals,
                        &graph,
                        &versions,
                        id,
                        n,
                        scaled_epsilon,
                        aspect_ratio_factor,
                        factor,
                    ));
                }
            }
        }

        // Collapse the cheapest edge while any live candidate stays under
        // the concavity budget. Each collapse removes a vertex, so the loop
        // terminates.
        loop {
            let any_below = heap.iter().any(|c| {
                self.is_live(c, &versions) && c.concavity < threshold
            });
            if !any_below {
                break;
            }

            let Some(candidate) = heap.pop() else {
                break;
            };
            if !self.is_live(&candidate, &versions) {
                continue;
            }

            // Merge the second vertex's ancestry into the first.
            let absorbed = graph.vertex(candidate.v2).unwrap().ancestors.clone();
            let keeper = graph.vertex_mut(candidate.v1).unwrap();
            keeper.ancestors = utils::union_sorted(&keeper.ancestors, &absorbed);
            utils::insert_sorted(&mut keeper.ancestors, candidate.v2);

            graph.collapse(candidate.v1, candidate.v2);

            // Every queued entry touching either endpoint is now stale.
            versions[candidate.v1] += 1;
            versions[candidate.v2] += 1;

            let neighbours = graph.vertex(candidate.v1).unwrap().neighbours.clone();
            for n in neighbours {
                heap.push(self.candidate(
                    &tri_mesh,
                    &normals,
                    &graph,
                    &versions,
                    candidate.v1,
                    n,
                    scaled_epsilon,
                    aspect_ratio_factor,
                    factor,
                ));
            }
        }

        // Close every surviving patch into a convex part.
        let mut parts = Vec::new();
        for vertex in &graph.vertices {
            let mut faces = vec![vertex.id];
            faces.extend_from_slice(&vertex.ancestors);

            let (surface, _) = mesh_from_faces(&tri_mesh, &normals, &faces);
            let points: Vec<Point<Real>> =
                surface.iter_vertices().map(|(_, v)| v.position).collect();

            match convex_hull_with_epsilon(&points, self.params.epsilon) {
                Ok(part) => parts.push(part),
                Err(err) => log::warn!("skipping a degenerate decomposition part: {err}"),
            }
        }

        parts
    }

    fn is_live(&self, candidate: &Candidate, versions: &[u32]) -> bool {
        versions[candidate.v1] == candidate.version1
            && versions[candidate.v2] == candidate.version2
    }

    // Evaluates the merge of two graph vertices: builds the surface their
    // patches would form, hulls it, and measures concavity and compactness.
    fn candidate(
        &self,
        tri_mesh: &HalfEdgeMesh,
        normals: &NormalMap,
        graph: &DualGraph,
        versions: &[u32],
        id1: usize,
        id2: usize,
        scaled_epsilon: Real,
        aspect_ratio_factor: Real,
        factor: Real,
    ) -> Candidate {
        let v1 = graph.vertex(id1).unwrap();
        let v2 = graph.vertex(id2).unwrap();

        let mut faces = utils::union_sorted(&v1.ancestors, &v2.ancestors);
        utils::insert_sorted(&mut faces, id1);
        utils::insert_sorted(&mut faces, id2);

        let (surface, surface_normals) = mesh_from_faces(tri_mesh, normals, &faces);
        let points: Vec<Point<Real>> =
            surface.iter_vertices().map(|(_, v)| v.position).collect();

        let concavity = match convex_hull_with_epsilon(&points, self.params.epsilon) {
            Ok((hull, hull_normals)) => self.concavity(
                &surface,
                &surface_normals,
                &hull,
                &hull_normals,
                scaled_epsilon,
            ),
            // A surface too degenerate to hull has nothing concave about it.
            Err(_) => 0.0,
        };

        let aspect_ratio = aspect_ratio(&surface);
        let cost = concavity / factor + aspect_ratio_factor * aspect_ratio;

        Candidate {
            v1: id1,
            v2: id2,
            cost,
            concavity,
            version1: versions[id1],
            version2: versions[id2],
        }
    }

    // Concavity of a surface patch against its own convex hull. A planar
    // hull switches to the area-based 2D measure, anything else uses the
    // worst vertex-to-hull distance.
    fn concavity(
        &self,
        surface: &HalfEdgeMesh,
        surface_normals: &NormalMap,
        hull: &HalfEdgeMesh,
        hull_normals: &NormalMap,
        scaled_epsilon: Real,
    ) -> Real {
        let mut normals = hull_normals.values();
        let planar = match normals.next() {
            None => true,
            Some(first) => normals.all(|n| {
                (n.x - first.x).abs() <= scaled_epsilon
                    && (n.y - first.y).abs() <= scaled_epsilon
                    && (n.z - first.z).abs() <= scaled_epsilon
            }),
        };

        if planar {
            concavity_2d(surface, hull)
        } else {
            concavity_3d(surface, surface_normals, hull, hull_normals, scaled_epsilon)
        }
    }
}

// sqrt of the area the hull adds over the surface itself: how much of the
// flat hull the patch fails to cover.
fn concavity_2d(surface: &HalfEdgeMesh, hull: &HalfEdgeMesh) -> Real {
    let surface_area = mesh_area(surface);
    let (hull_tri, _) = half_edge_mesh::triangulate_faces(hull);
    let hull_area = mesh_area(&hull_tri);

    (hull_area - surface_area).max(0.0).sqrt()
}

// Worst distance from a surface vertex to the point where its normal ray
// exits the hull.
fn concavity_3d(
    surface: &HalfEdgeMesh,
    surface_normals: &NormalMap,
    hull: &HalfEdgeMesh,
    hull_normals: &NormalMap,
    scaled_epsilon: Real,
) -> Real {
    let mut max_concavity = 0.0;

    for (i, vertex) in surface.iter_vertices() {
        let normal = half_edge_mesh::vertex_normal(surface, surface_normals, i);

        if let Some(exit) =
            internal_intersection(hull, hull_normals, &vertex.position, &normal, scaled_epsilon)
        {
            let concavity = (exit - vertex.position).norm();
            max_concavity = concavity.max(max_concavity);
        }
    }

    max_concavity
}

// Intersections of a ray starting inside (or on) a convex hull with the
// hull's faces. A convex surface is crossed at most twice; the furthest hit
// from the origin is the one measuring concavity.
fn internal_intersection(
    hull: &HalfEdgeMesh,
    hull_normals: &NormalMap,
    origin: &Point<Real>,
    direction: &crate::math::Vector<Real>,
    epsilon: Real,
) -> Option<Point<Real>> {
    let mut best: Option<(Real, Point<Real>)> = None;

    for (i, face) in hull.iter_faces() {
        let Some(normal) = hull_normals.get(&i) else {
            continue;
        };
        let anchor = hull.vertex(hull.edge(face.edge).unwrap().vertex).unwrap().position;

        if let Some(hit) =
            utils::ray_plane_intersection(origin, direction, &anchor, normal, epsilon)
        {
            if half_edge_mesh::point_on_face(hull, i, normal, &hit, epsilon) {
                let dist = (hit - origin).norm();
                if best.map_or(true, |(d, _)| dist > d) {
                    best = Some((dist, hit));
                }
            }
        }
    }

    best.map(|(_, hit)| hit)
}

// Compactness penalty of a triangulated surface patch: perimeter squared
// over 4π times area, 1.0 for a disc, growing as the outline stretches.
fn aspect_ratio(surface: &HalfEdgeMesh) -> Real {
    let mut perimeter = 0.0;
    for (i, edge) in surface.iter_edges() {
        if edge.face.is_some() && surface.edge(edge.opposite).unwrap().face.is_none() {
            let from = surface.vertex(surface.edge_source(i)).unwrap().position;
            let to = surface.vertex(edge.vertex).unwrap().position;
            perimeter += (to - from).norm();
        }
    }

    let area = mesh_area(surface);
    if area <= crate::math::DEFAULT_EPSILON {
        return 0.0;
    }

    perimeter * perimeter / (4.0 * std::f32::consts::PI * area)
}

fn mesh_area(mesh: &HalfEdgeMesh) -> Real {
    let mut area = 0.0;
    for (i, _) in mesh.iter_faces() {
        let v = mesh.face_vertices(i);
        area += utils::triangle_area(
            &mesh.vertex(v[0]).unwrap().position,
            &mesh.vertex(v[1]).unwrap().position,
            &mesh.vertex(v[2]).unwrap().position,
        );
    }
    area
}

// Extracts the sub-mesh formed by the given faces, carrying their normals
// over.
fn mesh_from_faces(
    mesh: &HalfEdgeMesh,
    normals: &NormalMap,
    faces: &[usize],
) -> (HalfEdgeMesh, NormalMap) {
    let mut out = HalfEdgeMesh::new();
    let mut out_normals = NormalMap::new();
    let mut vertex_map = std::collections::HashMap::new();

    for &face in faces {
        let mut loop_vertices = Vec::new();
        for v in mesh.face_vertices(face) {
            let mapped = *vertex_map
                .entry(v)
                .or_insert_with(|| out.add_vertex(mesh.vertex(v).unwrap().position));
            loop_vertices.push(mapped);
        }

        match out.add_face(&loop_vertices) {
            Ok(new_face) => {
                let _ = out_normals.insert(new_face, normals[&face]);
            }
            Err(err) => log::debug!("dropping face {face} from a surface patch: {err}"),
        }
    }

    (out, out_normals)
}
