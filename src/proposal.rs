//! In-memory cache of pending proposals

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{RegistryError, Result};

/// Pending, not-yet-durable schema values keyed by name.
///
/// At most one proposal exists per name at any instant; proposing again
/// before commit replaces the staged value (last-proposer-wins). A
/// successful commit consumes the entry.
pub struct ProposalCache {
    pending: Mutex<HashMap<String, String>>,
}

impl ProposalCache {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Stage a proposal, replacing any prior uncommitted value for `name`
    pub fn propose(&self, name: &str, content: &str) -> Result<()> {
        let mut pending = self.lock()?;
        pending.insert(name.to_string(), content.to_string());
        Ok(())
    }

    /// Acquire the cache lock for a full commit critical section.
    ///
    /// Commit must hold this guard across its entire
    /// read-mint-append-delete sequence; releasing it between steps lets a
    /// racing commit observe a stale or already-consumed proposal.
    pub fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.pending
            .lock()
            .map_err(|_| RegistryError::Durability("proposal cache mutex poisoned".to_string()))
    }
}

impl Default for ProposalCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propose_stages_value() {
        let cache = ProposalCache::new();
        cache.propose("user", "content").unwrap();
        assert_eq!(cache.lock().unwrap().get("user").map(String::as_str), Some("content"));
    }

    #[test]
    fn test_repropose_replaces_value() {
        let cache = ProposalCache::new();
        cache.propose("user", "first").unwrap();
        cache.propose("user", "second").unwrap();

        let pending = cache.lock().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.get("user").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_names_are_independent() {
        let cache = ProposalCache::new();
        cache.propose("user", "a").unwrap();
        cache.propose("order", "b").unwrap();
        assert_eq!(cache.lock().unwrap().len(), 2);
    }
}
