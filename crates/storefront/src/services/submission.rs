//! In-flight checkout submission tracking.
//!
//! The checkout state machine rejects a second submit on the same session
//! object, but the flow is stateless over HTTP: every POST rebuilds the
//! machine, so two rapid clicks on "Place order" would each pass the guard
//! and charge twice. This registry pins the guard to the shopper's session
//! id for the duration of the charge, so the payment side effect still runs
//! at most once per shopper at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which sessions have a payment submission in flight.
#[derive(Clone, Default)]
pub struct SubmissionLocks {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SubmissionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the submission slot for a session.
    ///
    /// Returns `None` when that session already has a submission in
    /// flight; otherwise the permit holds the slot until dropped.
    #[must_use]
    pub fn try_begin(&self, key: &str) -> Option<SubmissionPermit> {
        let mut in_flight = self.in_flight.lock().ok()?;
        if in_flight.insert(key.to_owned()) {
            Some(SubmissionPermit {
                locks: Arc::clone(&self.in_flight),
                key: key.to_owned(),
            })
        } else {
            None
        }
    }
}

/// Holds a session's submission slot; released on drop, so every exit path
/// out of the submit handler frees it.
pub struct SubmissionPermit {
    locks: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.locks.lock() {
            in_flight.remove(&self.key);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_for_the_same_session_is_refused() {
        let locks = SubmissionLocks::new();
        let permit = locks.try_begin("session-a").unwrap();
        assert!(locks.try_begin("session-a").is_none());
        drop(permit);
        assert!(locks.try_begin("session-a").is_some());
    }

    #[test]
    fn sessions_do_not_block_each_other() {
        let locks = SubmissionLocks::new();
        let _a = locks.try_begin("session-a").unwrap();
        assert!(locks.try_begin("session-b").is_some());
    }
}
