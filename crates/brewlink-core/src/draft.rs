// ── Form draft reconciliation ──
//
// A consumer editing a settings form holds a `Draft<T>` over the slice
// it edits. Pushes keep arriving underneath the form; one reusable rule
// decides what the form should show.

/// An in-progress local edit of a slice value.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
    /// The last store value this draft was based on.
    pub base: T,
    /// The value as edited locally.
    pub edited: T,
}

impl<T: Clone + PartialEq> Draft<T> {
    pub fn new(value: T) -> Self {
        Self {
            base: value.clone(),
            edited: value,
        }
    }

    /// The user has changed something since the last base.
    pub fn is_dirty(&self) -> bool {
        self.edited != self.base
    }

    pub fn edit(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.edited);
    }

    /// Discard local edits, returning to the base value.
    pub fn revert(&mut self) {
        self.edited = self.base.clone();
    }

    /// Fold an incoming store value into the draft.
    ///
    /// A clean draft follows the store wholesale. A dirty draft keeps
    /// the user's edits and only moves its base, so a later revert (or
    /// dirtiness check) compares against what the appliance now holds.
    #[must_use]
    pub fn reconcile(mut self, incoming: T) -> Self {
        if self.is_dirty() {
            self.base = incoming;
        } else {
            self.base = incoming.clone();
            self.edited = incoming;
        }
        self
    }
}
