//! The GJK algorithm for intersection detection.

pub use self::gjk::GjkDetector;
pub use self::simplex::{Simplex, SimplexState};
pub use self::support_point::SupportPoint;

mod gjk;
mod simplex;
mod support_point;
