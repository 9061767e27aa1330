//! Committed schema records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::version::VersionId;

/// A single committed schema record in the log store.
///
/// Records are append-only: once written, `(name, version)` never changes
/// and the content is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Schema name the record was committed under
    pub name: String,
    /// Version minted for this commit
    pub version: VersionId,
    /// The schema content, opaque to the registry
    pub content: String,
    /// SHA256 checksum of the content
    pub checksum: Checksum,
    /// When this record was committed
    pub created_at: DateTime<Utc>,
}

impl SchemaRecord {
    /// Create a new record, computing its checksum
    pub fn new(name: impl Into<String>, version: VersionId, content: impl Into<String>) -> Self {
        let content = content.into();
        let checksum = Checksum::from_str(&content);
        Self {
            name: name.into(),
            version,
            content,
            checksum,
            created_at: Utc::now(),
        }
    }

    /// Verify the stored checksum still matches the content
    pub fn verify_checksum(&self) -> bool {
        self.checksum.verify(&self.content)
    }
}
