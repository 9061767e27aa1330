//! Schema version identifiers and minting

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// An opaque, globally-unique version identifier.
///
/// Minted exactly once at commit time and never reused; two commits under
/// the same schema name always carry distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(String);

impl VersionId {
    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VersionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mints version identifiers at commit time.
///
/// Minting runs before any log mutation; a failure aborts the commit and
/// leaves the pending proposal staged.
pub trait VersionAssigner: Send + Sync {
    /// Produce a fresh identifier
    fn mint(&self) -> Result<VersionId>;
}

/// Default assigner backed by random 128-bit UUIDs
pub struct UuidAssigner;

impl VersionAssigner for UuidAssigner {
    fn mint(&self) -> Result<VersionId> {
        Ok(VersionId(Uuid::new_v4().to_string()))
    }
}
