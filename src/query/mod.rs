//! Intersection tests, penetration queries and the persistent narrow phase.

pub use self::contact::Contact;
pub use self::manifold::{Manifold, MAX_CONTACTS};
pub use self::narrow_phase::NarrowPhase;

pub mod clip;
pub mod epa;
pub mod gjk;

mod contact;
mod manifold;
mod narrow_phase;
