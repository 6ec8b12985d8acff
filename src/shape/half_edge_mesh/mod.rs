//! An indexed, mutable half-edge boundary representation and the geometric
//! algorithms operating on it.

pub use self::algorithms::{
    compute_normals, face_normal, furthest_vertex_toward, horizon, mesh_aabb, point_on_face,
    raycast_from_inside, triangulate_faces, vertex_normal,
};
pub use self::mesh::{HEEdge, HEFace, HEVertex, HalfEdgeMesh, MeshError, INVALID_INDEX};

use crate::math::{Real, Vector};
use std::collections::BTreeMap;

/// A mapping from face indices to face normals.
///
/// Kept separate from the [`HalfEdgeMesh`] itself and recomputed whenever the
/// topology changes. The ordered map makes iteration deterministic, which the
/// decomposition pipeline relies on for reproducible merge ordering.
pub type NormalMap = BTreeMap<usize, Vector<Real>>;

mod algorithms;
mod mesh;
