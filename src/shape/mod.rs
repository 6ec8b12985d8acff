//! Shapes and colliders usable for collision detection.

pub use self::concave::{Collider, ConcaveCollider};
pub use self::convex::ConvexCollider;
pub use self::half_edge_mesh::{
    HEEdge, HEFace, HEVertex, HalfEdgeMesh, MeshError, NormalMap, INVALID_INDEX,
};
pub use self::support_map::SupportMap;

mod concave;
mod convex;
pub mod half_edge_mesh;
mod support_map;
