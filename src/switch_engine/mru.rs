//! Most-recently-used ordering of switchable candidates.
//!
//! The tracker owns the order and nothing else; eligibility is always
//! re-checked against the process directory so hidden, terminated, or
//! non-regular apps (and our own process) never linger in the list.

use tracing::{debug, trace};

use super::{AppId, ProcessDirectory};

#[derive(Debug, Default)]
pub struct MruTracker {
    order: Vec<AppId>,
}

impl MruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial order from the directory's current candidates,
    /// putting the frontmost app first when it is present.
    pub fn seed(&mut self, directory: &dyn ProcessDirectory) {
        self.order.clear();
        let frontmost = directory.frontmost();
        for info in directory.candidates() {
            if Some(info.id) == frontmost {
                self.order.insert(0, info.id);
            } else {
                self.order.push(info.id);
            }
        }
        self.prune(directory);
        debug!(count = self.order.len(), "seeded MRU list");
    }

    /// Moves `id` to the front. Ineligible candidates are ignored.
    pub fn record_activation(&mut self, id: AppId, directory: &dyn ProcessDirectory) {
        let eligible = id != directory.own_id()
            && directory.info(id).is_some_and(|info| info.is_eligible());
        if !eligible {
            trace!(?id, "ignoring activation of ineligible candidate");
            return;
        }
        self.order.retain(|&other| other != id);
        self.order.insert(0, id);
        self.prune(directory);
    }

    /// Drops every entry that no longer passes the eligibility check.
    pub fn prune(&mut self, directory: &dyn ProcessDirectory) {
        let own = directory.own_id();
        self.order.retain(|&id| {
            id != own && directory.info(id).is_some_and(|info| info.is_eligible())
        });
    }

    /// Removes a specific candidate (used when it is explicitly quit).
    pub fn remove(&mut self, id: AppId) {
        self.order.retain(|&other| other != id);
    }

    /// Current order, most recent first. Callers get their own copy.
    pub fn snapshot(&self) -> Vec<AppId> {
        self.order.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
