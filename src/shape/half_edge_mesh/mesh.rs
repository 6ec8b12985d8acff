use crate::math::{Point, Real};
use slab::Slab;
use smallvec::SmallVec;
use std::collections::HashMap;
use thiserror::Error;

/// Sentinel index used for half-edge links that are not set.
///
/// Only boundary half-edges (those with no incident face) carry an unset
/// `next` link.
pub const INVALID_INDEX: usize = usize::MAX;

/// Failure modes of the half-edge mesh surgery operations and of
/// [`HalfEdgeMesh::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face was given fewer than three vertices.
    #[error("a face needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// A face referenced a vertex index that is not part of the mesh.
    #[error("vertex {0} is not part of the mesh")]
    MissingVertex(usize),
    /// Inserting the face would give the directed edge a second incident face.
    #[error("inserting the face would make the edge {0} -> {1} non-manifold")]
    NonManifold(usize, usize),
    /// The two faces passed to [`HalfEdgeMesh::merge_faces`] do not share
    /// exactly one edge.
    #[error("faces {0} and {1} do not share exactly one edge")]
    NotMergeable(usize, usize),
    /// A half-edge's opposite does not point back at it.
    #[error("half-edge {0} has a broken opposite link")]
    BrokenOpposite(usize),
    /// Following `next` around a face never returns to the starting edge.
    #[error("the edge loop of face {0} does not close")]
    OpenFaceLoop(usize),
    /// The mesh holds no active face.
    #[error("the mesh has no faces")]
    Empty,
}

/// A mesh vertex: a location and one of its outgoing half-edges.
#[derive(Debug, Clone, PartialEq)]
pub struct HEVertex {
    /// The 3D position of the vertex.
    pub position: Point<Real>,
    /// One half-edge whose source is this vertex, if any edge is incident.
    pub edge: Option<usize>,
}

/// A directed half-edge.
///
/// Each undirected mesh edge is stored as two opposite half-edges. A
/// half-edge without incident face (`face == None`) lies on a surface
/// boundary and has no `next` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HEEdge {
    /// The index of the vertex this half-edge points to.
    pub vertex: usize,
    /// The face this half-edge borders, or `None` on a boundary.
    pub face: Option<usize>,
    /// The next half-edge around the incident face.
    pub next: usize,
    /// The opposite half-edge.
    pub opposite: usize,
}

/// A mesh face, referencing one of the half-edges of its boundary loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HEFace {
    /// One of the half-edges bounding this face.
    pub edge: usize,
}

/// An indexed triangle-or-polygon mesh in half-edge representation.
///
/// Vertices, half-edges and faces live in arenas with a free-list, so the
/// index of an element never changes while it is alive and removed slots are
/// skipped by iteration. The structure supports open surfaces: half-edges
/// bounding a hole simply have no incident face.
///
/// Faces inserted through [`HalfEdgeMesh::add_face`] are assumed to be planar
/// convex polygons given in counter-clockwise order as seen from the outside;
/// the algorithms operating on convex hulls additionally assume global
/// convexity and do not check it at runtime.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    vertices: Slab<HEVertex>,
    edges: Slab<HEEdge>,
    faces: Slab<HEFace>,
    // Directed (source, destination) -> half-edge lookup.
    edge_map: HashMap<(usize, usize), usize>,
}

impl PartialEq for HalfEdgeMesh {
    fn eq(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len()
            && self.edges.len() == other.edges.len()
            && self.faces.len() == other.faces.len()
            && self.vertices.iter().eq(other.vertices.iter())
            && self.edges.iter().eq(other.edges.iter())
            && self.faces.iter().eq(other.faces.iter())
            && self.edge_map == other.edge_map
    }
}

impl HalfEdgeMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The number of live faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Read access to the vertex at index `i`, if alive.
    pub fn vertex(&self, i: usize) -> Option<&HEVertex> {
        self.vertices.get(i)
    }

    /// Read access to the half-edge at index `i`, if alive.
    pub fn edge(&self, i: usize) -> Option<&HEEdge> {
        self.edges.get(i)
    }

    /// Read access to the face at index `i`, if alive.
    pub fn face(&self, i: usize) -> Option<&HEFace> {
        self.faces.get(i)
    }

    /// Whether the face index `i` refers to a live face.
    pub fn contains_face(&self, i: usize) -> bool {
        self.faces.contains(i)
    }

    /// Iterates over the live vertices in index order.
    pub fn iter_vertices(&self) -> slab::Iter<'_, HEVertex> {
        self.vertices.iter()
    }

    /// Iterates over the live half-edges in index order.
    pub fn iter_edges(&self) -> slab::Iter<'_, HEEdge> {
        self.edges.iter()
    }

    /// Iterates over the live faces in index order.
    pub fn iter_faces(&self) -> slab::Iter<'_, HEFace> {
        self.faces.iter()
    }

    /// The source vertex of the half-edge `e`.
    pub fn edge_source(&self, e: usize) -> usize {
        self.edges[self.edges[e].opposite].vertex
    }

    /// The half-edge going from `a` to `b`, if it exists.
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.edge_map.get(&(a, b)).copied()
    }

    /// Adds a vertex to the mesh and returns its index.
    pub fn add_vertex(&mut self, position: Point<Real>) -> usize {
        self.vertices.insert(HEVertex {
            position,
            edge: None,
        })
    }

    /// Adds a face built from the given vertex loop and returns its index.
    ///
    /// The vertices must be given in counter-clockwise order as seen from the
    /// front of the face. Fails without modifying the mesh if fewer than three
    /// vertices are given, if a vertex does not exist, or if one of the loop's
    /// directed edges already borders a face (non-manifold insertion).
    pub fn add_face(&mut self, vertex_loop: &[usize]) -> Result<usize, MeshError> {
        if vertex_loop.len() < 3 {
            return Err(MeshError::TooFewVertices(vertex_loop.len()));
        }

        for (i, &a) in vertex_loop.iter().enumerate() {
            if !self.vertices.contains(a) {
                return Err(MeshError::MissingVertex(a));
            }

            let b = vertex_loop[(i + 1) % vertex_loop.len()];
            if a == b {
                return Err(MeshError::NonManifold(a, b));
            }
            if let Some(&e) = self.edge_map.get(&(a, b)) {
                if self.edges[e].face.is_some() {
                    return Err(MeshError::NonManifold(a, b));
                }
            }
        }

        let face = self.faces.insert(HEFace { edge: INVALID_INDEX });

        let mut loop_edges: SmallVec<[usize; 8]> = SmallVec::new();
        for (i, &a) in vertex_loop.iter().enumerate() {
            let b = vertex_loop[(i + 1) % vertex_loop.len()];
            let e = self.get_or_create_edge(a, b);
            self.edges[e].face = Some(face);
            if self.vertices[a].edge.is_none() {
                self.vertices[a].edge = Some(e);
            }
            loop_edges.push(e);
        }

        for (i, &e) in loop_edges.iter().enumerate() {
            self.edges[e].next = loop_edges[(i + 1) % loop_edges.len()];
        }
        self.faces[face].edge = loop_edges[0];

        Ok(face)
    }

    /// Removes a face, turning its half-edges into boundary edges.
    ///
    /// Half-edge pairs whose both sides end up without a face are removed
    /// entirely. Vertices are never removed, even if they become isolated.
    pub fn remove_face(&mut self, face: usize) {
        if !self.faces.contains(face) {
            return;
        }

        let loop_edges: SmallVec<[usize; 8]> = self.face_edges(face).collect();
        let _ = self.faces.remove(face);

        for e in loop_edges {
            let opposite = self.edges[e].opposite;

            if self.edges[opposite].face.is_none() {
                let a = self.edges[opposite].vertex;
                let b = self.edges[e].vertex;
                let _ = self.edge_map.remove(&(a, b));
                let _ = self.edge_map.remove(&(b, a));
                let _ = self.edges.remove(e);
                let _ = self.edges.remove(opposite);
                self.fix_vertex_edge(a);
                self.fix_vertex_edge(b);
            } else {
                self.edges[e].face = None;
                self.edges[e].next = INVALID_INDEX;
            }
        }
    }

    /// Merges `face2` into `face1`.
    ///
    /// The two faces must share exactly one edge. The shared half-edge pair is
    /// spliced out and the two boundary loops are concatenated into a single
    /// loop owned by `face1`, whose index stays valid for external references.
    pub fn merge_faces(&mut self, face1: usize, face2: usize) -> Result<usize, MeshError> {
        if !self.faces.contains(face1) || !self.faces.contains(face2) {
            return Err(MeshError::NotMergeable(face1, face2));
        }

        let shared: SmallVec<[usize; 2]> = self
            .face_edges(face1)
            .filter(|&e| self.edges[self.edges[e].opposite].face == Some(face2))
            .collect();

        if shared.len() != 1 {
            return Err(MeshError::NotMergeable(face1, face2));
        }

        let e = shared[0];
        let opposite = self.edges[e].opposite;
        let prev_e = self.prev_in_face(e);
        let prev_o = self.prev_in_face(opposite);

        // Hand every remaining edge of face2 over to face1.
        let face2_edges: SmallVec<[usize; 8]> = self.face_edges(face2).collect();
        for f2e in face2_edges {
            if f2e != opposite {
                self.edges[f2e].face = Some(face1);
            }
        }

        // Splice the shared pair out of both loops.
        let after_e = self.edges[e].next;
        let after_o = self.edges[opposite].next;
        self.edges[prev_e].next = after_o;
        self.edges[prev_o].next = after_e;
        self.faces[face1].edge = prev_e;
        let _ = self.faces.remove(face2);

        let a = self.edges[opposite].vertex;
        let b = self.edges[e].vertex;
        let _ = self.edge_map.remove(&(a, b));
        let _ = self.edge_map.remove(&(b, a));
        let _ = self.edges.remove(e);
        let _ = self.edges.remove(opposite);
        self.fix_vertex_edge(a);
        self.fix_vertex_edge(b);

        Ok(face1)
    }

    /// Iterates over the half-edges bounding `face`, in loop order.
    pub fn face_edges(&self, face: usize) -> FaceEdges<'_> {
        let start = self.faces[face].edge;
        FaceEdges {
            mesh: self,
            start,
            current: Some(start),
        }
    }

    /// The vertex indices bounding `face`, in loop order.
    pub fn face_vertices(&self, face: usize) -> SmallVec<[usize; 8]> {
        self.face_edges(face)
            .map(|e| self.edges[e].vertex)
            .collect()
    }

    /// The half-edge preceding `e` in its face loop.
    pub fn prev_in_face(&self, e: usize) -> usize {
        let mut current = e;
        loop {
            let next = self.edges[current].next;
            if next == e {
                return current;
            }
            current = next;
        }
    }

    /// Checks the structural invariants of the mesh.
    ///
    /// Verifies that opposite links are involutive, that every face loop
    /// closes, and that the directed-edge lookup is consistent. Does not check
    /// geometric properties such as convexity or planarity.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (i, edge) in self.edges.iter() {
            let opposite = edge.opposite;
            if !self.edges.contains(opposite)
                || self.edges[opposite].opposite != i
                || opposite == i
            {
                return Err(MeshError::BrokenOpposite(i));
            }

            let source = self.edges[opposite].vertex;
            if self.edge_map.get(&(source, edge.vertex)) != Some(&i) {
                return Err(MeshError::BrokenOpposite(i));
            }
        }

        for (i, face) in self.faces.iter() {
            let mut current = face.edge;
            let mut steps = 0;
            loop {
                if !self.edges.contains(current) || self.edges[current].face != Some(i) {
                    return Err(MeshError::OpenFaceLoop(i));
                }
                current = self.edges[current].next;
                steps += 1;
                if current == face.edge {
                    break;
                }
                if steps > self.edges.capacity() {
                    return Err(MeshError::OpenFaceLoop(i));
                }
            }
            if steps < 3 {
                return Err(MeshError::OpenFaceLoop(i));
            }
        }

        Ok(())
    }

    fn get_or_create_edge(&mut self, a: usize, b: usize) -> usize {
        if let Some(&e) = self.edge_map.get(&(a, b)) {
            return e;
        }

        let e = self.edges.insert(HEEdge {
            vertex: b,
            face: None,
            next: INVALID_INDEX,
            opposite: INVALID_INDEX,
        });
        let opposite = self.edges.insert(HEEdge {
            vertex: a,
            face: None,
            next: INVALID_INDEX,
            opposite: e,
        });
        self.edges[e].opposite = opposite;
        let _ = self.edge_map.insert((a, b), e);
        let _ = self.edge_map.insert((b, a), opposite);
        e
    }

    // Makes sure `vertex.edge` points at a live outgoing half-edge, or `None`
    // if the vertex became isolated.
    fn fix_vertex_edge(&mut self, vertex: usize) {
        if let Some(e) = self.vertices[vertex].edge {
            if self.edges.contains(e) && self.edge_source(e) == vertex {
                return;
            }
        }

        self.vertices[vertex].edge = self
            .edges
            .iter()
            .find(|(e, _)| self.edge_source(*e) == vertex)
            .map(|(e, _)| e);
    }
}

/// Iterator over the half-edges of a face loop.
pub struct FaceEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    start: usize,
    current: Option<usize>,
}

impl<'a> Iterator for FaceEdges<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.current?;
        let next = self.mesh.edges[current].next;
        self.current = if next == self.start { None } else { Some(next) };
        Some(current)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;

    fn quad_pair() -> (HalfEdgeMesh, usize, usize) {
        // Two quads sharing the edge 1 -> 2.
        let mut mesh = HalfEdgeMesh::new();
        for p in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
        ] {
            let _ = mesh.add_vertex(Point::new(p[0], p[1], p[2]));
        }
        let f1 = mesh.add_face(&[0, 1, 2, 3]).unwrap();
        let f2 = mesh.add_face(&[1, 4, 5, 2]).unwrap();
        (mesh, f1, f2)
    }

    #[test]
    fn add_face_rejects_degenerate_input() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point::origin());
        let b = mesh.add_vertex(Point::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.add_face(&[a, b]), Err(MeshError::TooFewVertices(2)));
        assert_eq!(mesh.add_face(&[a, b, 17]), Err(MeshError::MissingVertex(17)));
    }

    #[test]
    fn add_face_rejects_non_manifold_insertion() {
        let (mut mesh, _, _) = quad_pair();
        // 1 -> 2 already borders the first quad.
        assert_eq!(mesh.add_face(&[1, 2, 4]), Err(MeshError::NonManifold(1, 2)));
        mesh.validate().unwrap();
    }

    #[test]
    fn merge_faces_concatenates_the_loops() {
        let (mut mesh, f1, f2) = quad_pair();
        let merged = mesh.merge_faces(f1, f2).unwrap();

        assert_eq!(merged, f1);
        assert!(!mesh.contains_face(f2));
        mesh.validate().unwrap();

        let mut loop_vertices: Vec<_> = mesh.face_vertices(merged).into_vec();
        assert_eq!(loop_vertices.len(), 6);
        loop_vertices.sort_unstable();
        assert_eq!(loop_vertices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn merge_faces_requires_a_single_shared_edge() {
        let (mut mesh, f1, _) = quad_pair();
        let f3 = mesh.add_face(&[3, 2, 5]).unwrap();
        // f1 and f3 share the edge 2 -> 3; merging f1 with itself must fail.
        assert_eq!(
            mesh.merge_faces(f1, f1),
            Err(MeshError::NotMergeable(f1, f1))
        );
        assert!(mesh.merge_faces(f1, f3).is_ok());
        mesh.validate().unwrap();
    }

    #[test]
    fn remove_face_releases_unused_edges() {
        let (mut mesh, f1, f2) = quad_pair();
        let edges_before = mesh.iter_edges().count();

        mesh.remove_face(f2);
        mesh.validate().unwrap();
        assert!(mesh.contains_face(f1));
        // The three outer edges of f2 disappear, the shared one stays as a
        // boundary edge.
        assert_eq!(mesh.iter_edges().count(), edges_before - 6);
        assert!(mesh.edge_between(1, 4).is_none());
        assert!(mesh.edge_between(2, 1).is_some());
    }
}
