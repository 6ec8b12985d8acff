use crate::query::Contact;
use arrayvec::ArrayVec;

/// The maximum number of contacts a manifold retains.
pub const MAX_CONTACTS: usize = 4;

/// A persistent set of contact points between one ordered pair of colliders.
///
/// The narrow phase refreshes the manifold in place every step: contacts
/// close to a previous one replace it (preserving the slot for solver warm
/// starting), new ones are appended, stale ones are dropped, and the set is
/// reduced back to at most [`MAX_CONTACTS`] entries.
///
/// The manifold does not own its colliders; the same ordered pair must be
/// passed to [`crate::query::NarrowPhase::collide`] on every frame.
#[derive(Debug, Clone, Default)]
pub struct Manifold {
    pub(crate) contacts: ArrayVec<Contact, MAX_CONTACTS>,
    updated: bool,
}

impl Manifold {
    /// Creates an empty manifold.
    pub fn new() -> Self {
        Self::default()
    }

    /// The retained contacts.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Whether the last narrow-phase update changed this manifold.
    ///
    /// The owning system typically reads this to decide whether to emit a
    /// collision notification, then calls [`Manifold::reset_updated`].
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Clears the updated flag.
    pub fn reset_updated(&mut self) {
        self.updated = false;
    }

    /// Drops every contact.
    pub fn clear(&mut self) {
        if !self.contacts.is_empty() {
            self.updated = true;
        }
        self.contacts.clear();
    }

    pub(crate) fn set_updated(&mut self, updated: bool) {
        self.updated = updated;
    }
}
