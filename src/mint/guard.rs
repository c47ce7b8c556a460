use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::MintError;

/// Per-list in-flight guard.
///
/// At most one mint attempt per list id runs at a time. A second attempt for
/// the same list is refused rather than queued. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MintGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl MintGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `list_id`; fails with `AttemptInProgress` if already claimed
    pub fn try_acquire(&self, list_id: &str) -> Result<MintPermit, MintError> {
        if !self.lock().insert(list_id.to_string()) {
            debug!(list_id, "Mint attempt refused, another is in flight");
            return Err(MintError::AttemptInProgress {
                list_id: list_id.to_string(),
            });
        }

        Ok(MintPermit {
            guard: self.clone(),
            list_id: list_id.to_string(),
        })
    }

    pub fn is_in_flight(&self, list_id: &str) -> bool {
        self.lock().contains(list_id)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held for the lifetime of one attempt; releases the list on drop
#[derive(Debug)]
pub struct MintPermit {
    guard: MintGuard,
    list_id: String,
}

impl MintPermit {
    pub fn list_id(&self) -> &str {
        &self.list_id
    }
}

impl Drop for MintPermit {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.list_id);
    }
}
