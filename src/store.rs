//! Storage facade coordinating the proposal cache and the log store

use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::consensus::{Consensus, LocalConsensus};
use crate::error::{RegistryError, Result};
use crate::log::SchemaLog;
use crate::proposal::ProposalCache;
use crate::schema::SchemaRecord;
use crate::version::{UuidAssigner, VersionAssigner, VersionId};

/// Storage contract consumed by the request layer
pub trait Storage: Send + Sync {
    /// Stage `content` as the pending proposal for `name`
    fn propose(&self, name: &str, content: &str) -> Result<()>;

    /// Durably commit the pending proposal for `name`
    fn commit(&self, name: &str) -> Result<()>;

    /// All versions ever committed under `name`, oldest first
    fn lookup_versions(&self, name: &str) -> Result<Vec<VersionId>>;

    /// Content committed under `(name, version)`
    fn lookup(&self, name: &str, version: &str) -> Result<String>;

    /// Release the underlying log connection
    fn close(&self);
}

/// Stores committed values in an append-only SQLite log and caches
/// proposed changes in memory.
///
/// Constructed once at startup and shared by reference into the request
/// layer; there is no global instance.
pub struct SqlStore {
    proposals: ProposalCache,
    log: SchemaLog,
    assigner: Box<dyn VersionAssigner>,
    consensus: Box<dyn Consensus>,
}

impl SqlStore {
    /// Open a store that persists committed data at the configured
    /// location, with the single-node agreement strategy.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let log = SchemaLog::open(&config.location)?;
        Ok(Self::with_parts(
            log,
            Box::new(UuidAssigner),
            Box::new(LocalConsensus),
        ))
    }

    /// Assemble a store from explicit parts.
    ///
    /// This is the seam a distributed deployment uses to swap in its
    /// agreement strategy or version assigner.
    pub fn with_parts(
        log: SchemaLog,
        assigner: Box<dyn VersionAssigner>,
        consensus: Box<dyn Consensus>,
    ) -> Self {
        Self {
            proposals: ProposalCache::new(),
            log,
            assigner,
            consensus,
        }
    }
}

impl Storage for SqlStore {
    fn propose(&self, name: &str, content: &str) -> Result<()> {
        debug!(name, "proposal staged");
        self.proposals.propose(name, content)
    }

    fn commit(&self, name: &str) -> Result<()> {
        // The guard spans the whole read-accept-mint-append-delete
        // sequence; a racing commit on the same name must observe either
        // the staged proposal or its absence, never a half-applied state.
        let mut pending = self.proposals.lock()?;

        let content = pending.get(name).cloned().ok_or_else(|| RegistryError::NotProposed {
            name: name.to_string(),
        })?;

        self.consensus.accept(name, &content)?;

        let version = self.assigner.mint()?;
        let record = SchemaRecord::new(name, version.clone(), content);
        self.log.append(&record)?;

        // Only a durable append evicts the proposal; any earlier failure
        // leaves it staged for retry.
        pending.remove(name);

        info!(name, version = %version, "schema committed");
        Ok(())
    }

    fn lookup_versions(&self, name: &str) -> Result<Vec<VersionId>> {
        self.log.versions(name)
    }

    fn lookup(&self, name: &str, version: &str) -> Result<String> {
        let record = self.log.fetch(name, version)?.ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
            version: version.to_string(),
        })?;

        if !record.verify_checksum() {
            return Err(RegistryError::Durability(format!(
                "checksum mismatch for '{}' version {}",
                name, version
            )));
        }

        Ok(record.content)
    }

    fn close(&self) {
        self.log.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn open_store(dir: &Path) -> SqlStore {
        let config = StorageConfig {
            location: dir.join("registry.db"),
        };
        SqlStore::open(&config).unwrap()
    }

    #[test]
    fn test_propose_then_commit() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        store.propose("user", "content").unwrap();
        store.commit("user").unwrap();

        let versions = store.lookup_versions("user").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(store.lookup("user", versions[0].as_str()).unwrap(), "content");
    }

    #[test]
    fn test_commit_without_proposal() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let err = store.commit("user").unwrap_err();
        assert!(matches!(err, RegistryError::NotProposed { .. }));
    }

    #[test]
    fn test_lookup_unknown_version() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let err = store.lookup("user", "nonexistent-version").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }
}
