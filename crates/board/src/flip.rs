//! Which signatures currently show their back face

use std::collections::HashSet;

/// Process-local display state; reset whenever the board reloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlippedState {
    ids: HashSet<String>,
}

impl FlippedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership for `id`; returns true when it is now flipped
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    #[inline]
    pub fn is_flipped(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
