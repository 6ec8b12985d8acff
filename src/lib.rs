/*!
riposte3d
=========

**riposte3d** is the narrow-phase collision detection and convex
decomposition core of a 3-dimensional real-time engine, written with the
rust programming language.

It detects intersections between convex hulls represented as half-edge
meshes (GJK), extracts contact normals and penetration depths (EPA),
maintains persistent contact manifolds, and pre-processes arbitrary
concave triangle meshes into sets of near-convex parts (HACD).
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.

extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

/// Aliases for mathematical types.
pub mod math {
    pub use na::{Isometry3, Matrix3, Point3, Translation3, UnitQuaternion, UnitVector3, Vector3};

    /// The scalar type used throughout this crate.
    pub use f32 as Real;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The transformation matrix type.
    pub use Isometry3 as Isometry;

    /// The rotation type.
    pub type Rotation = UnitQuaternion<Real>;

    /// The translation type.
    pub use Translation3 as Translation;
}
