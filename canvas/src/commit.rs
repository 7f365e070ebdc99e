//! Commit queue: keeps client commits for one element in order.
//!
//! At most one commit per element is in flight. A commit submitted while
//! another for the same element is outstanding waits; further commits fold
//! into the waiting one, later fields winning. When the in-flight commit
//! completes, the waiting one (if any) becomes in flight. Requests for an
//! element therefore reach the server in pointer-up order.

#[cfg(test)]
#[path = "commit_test.rs"]
mod commit_test;

use std::collections::{HashMap, HashSet};

use crate::doc::{ElementId, ElementPatch};

#[derive(Debug, Default)]
pub struct CommitQueue {
    in_flight: HashSet<ElementId>,
    pending: HashMap<ElementId, ElementPatch>,
}

impl CommitQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a commit. Returns the patch to send now, or `None` if it has to
    /// wait behind an in-flight commit for the same element.
    pub fn submit(&mut self, id: ElementId, patch: ElementPatch) -> Option<ElementPatch> {
        if self.in_flight.contains(&id) {
            self.pending.entry(id).or_default().merge(patch);
            return None;
        }
        self.in_flight.insert(id);
        Some(patch)
    }

    /// Mark the in-flight commit for `id` finished (successfully or not).
    /// Returns the next patch to send for that element, if one was waiting.
    pub fn complete(&mut self, id: &ElementId) -> Option<ElementPatch> {
        if let Some(next) = self.pending.remove(id) {
            return Some(next);
        }
        self.in_flight.remove(id);
        None
    }

    /// Drop everything tracked for an element, e.g. after it is deleted.
    pub fn forget(&mut self, id: &ElementId) {
        self.in_flight.remove(id);
        self.pending.remove(id);
    }

    #[must_use]
    pub fn is_in_flight(&self, id: &ElementId) -> bool {
        self.in_flight.contains(id)
    }

    /// The patch waiting behind the in-flight commit, if any.
    #[must_use]
    pub fn pending(&self, id: &ElementId) -> Option<&ElementPatch> {
        self.pending.get(id)
    }
}
