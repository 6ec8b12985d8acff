//! The Expanding Polytope Algorithm for penetration depth queries.

pub use self::epa::{EpaDetector, Penetration};

mod epa;
