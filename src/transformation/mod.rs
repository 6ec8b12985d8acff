//! Algorithms building new geometries from existing ones: convex hull
//! construction and approximate convex decomposition.

pub use self::convex_hull::{convex_hull, convex_hull_with_epsilon, ConvexHullError};

pub mod hacd;

mod convex_hull;
