use crate::shape::half_edge_mesh::HalfEdgeMesh;
use crate::utils;

/// A vertex of the dual graph: one face of the triangulated mesh, plus the
/// faces already merged into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualGraphVertex {
    /// The index of the mesh face this vertex stands for.
    pub id: usize,
    /// The ids of the adjacent graph vertices, kept sorted for binary
    /// search.
    pub neighbours: Vec<usize>,
    /// The face indices merged into this vertex so far, kept sorted.
    pub ancestors: Vec<usize>,
}

/// The face-adjacency graph of a triangulated mesh.
///
/// Vertices are stored sorted by id; adjacency is symmetric. Edge collapses
/// strictly reduce the vertex count, which bounds every loop iterating over
/// collapses.
#[derive(Debug, Clone, Default)]
pub struct DualGraph {
    /// The graph vertices, sorted by id.
    pub vertices: Vec<DualGraphVertex>,
}

impl DualGraph {
    /// Builds the dual graph of a mesh: one vertex per face, one edge per
    /// pair of faces sharing a mesh edge.
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let mut vertices: Vec<DualGraphVertex> = mesh
            .iter_faces()
            .map(|(id, _)| DualGraphVertex {
                id,
                neighbours: Vec::new(),
                ancestors: Vec::new(),
            })
            .collect();
        // Slab iteration is already in index order, which keeps the vertex
        // list sorted.

        for i in 0..vertices.len() {
            let id = vertices[i].id;
            let face_edges: Vec<usize> = mesh.face_edges(id).collect();
            for e in face_edges {
                let opposite = mesh.edge(e).unwrap().opposite;
                if let Some(other) = mesh.edge(opposite).unwrap().face {
                    utils::insert_sorted(&mut vertices[i].neighbours, other);
                }
            }
        }

        // Symmetry holds by construction: if faces f and g share an edge,
        // both loops record the other side.
        DualGraph { vertices }
    }

    /// The number of live vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graph has no vertex left.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertex with the given id.
    pub fn vertex(&self, id: usize) -> Option<&DualGraphVertex> {
        self.index_of(id).map(|i| &self.vertices[i])
    }

    /// Mutable access to the vertex with the given id.
    pub fn vertex_mut(&mut self, id: usize) -> Option<&mut DualGraphVertex> {
        self.index_of(id).map(move |i| &mut self.vertices[i])
    }

    /// Collapses the edge `(a, b)`: vertex `b` is removed and its adjacency
    /// is transferred to `a`.
    ///
    /// Ancestor bookkeeping is the caller's job; this only rewires the
    /// graph. Does nothing if either vertex is missing.
    pub fn collapse(&mut self, a: usize, b: usize) {
        let Some(bi) = self.index_of(b) else {
            return;
        };
        if self.index_of(a).is_none() {
            return;
        }

        let removed = self.vertices.remove(bi);

        for n in removed.neighbours {
            let Some(ni) = self.index_of(n) else {
                continue;
            };
            if let Ok(pos) = self.vertices[ni].neighbours.binary_search(&b) {
                let _ = self.vertices[ni].neighbours.remove(pos);
            }

            if n != a {
                utils::insert_sorted(&mut self.vertices[ni].neighbours, a);
                let ai = self.index_of(a).unwrap();
                utils::insert_sorted(&mut self.vertices[ai].neighbours, n);
            }
        }
    }

    fn index_of(&self, id: usize) -> Option<usize> {
        self.vertices.binary_search_by(|v| v.id.cmp(&id)).ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;

    // A strip of four triangles: 0-1-2-3 adjacency along the strip.
    fn strip() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        for x in 0..6 {
            let _ = mesh.add_vertex(Point::new(x as f32 / 2.0, (x % 2) as f32, 0.0));
        }
        let _ = mesh.add_face(&[0, 2, 1]).unwrap();
        let _ = mesh.add_face(&[1, 2, 3]).unwrap();
        let _ = mesh.add_face(&[2, 4, 3]).unwrap();
        let _ = mesh.add_face(&[3, 4, 5]).unwrap();
        mesh
    }

    #[test]
    fn adjacency_is_sorted_and_symmetric() {
        let graph = DualGraph::from_mesh(&strip());

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.vertex(0).unwrap().neighbours, vec![1]);
        assert_eq!(graph.vertex(1).unwrap().neighbours, vec![0, 2]);
        assert_eq!(graph.vertex(2).unwrap().neighbours, vec![1, 3]);
        assert_eq!(graph.vertex(3).unwrap().neighbours, vec![2]);
    }

    #[test]
    fn collapse_rewires_the_neighbours() {
        let mut graph = DualGraph::from_mesh(&strip());
        graph.collapse(1, 2);

        assert_eq!(graph.len(), 3);
        assert!(graph.vertex(2).is_none());
        assert_eq!(graph.vertex(1).unwrap().neighbours, vec![0, 3]);
        assert_eq!(graph.vertex(3).unwrap().neighbours, vec![1]);
    }
}
