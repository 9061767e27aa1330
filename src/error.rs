//! Error types for the schema registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry errors, tagged by kind so callers branch on the variant
/// rather than on message contents.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration failed: {0}")]
    Configuration(String),

    #[error("Cannot commit '{name}': no pending proposal")]
    NotProposed { name: String },

    #[error("Storage failure: {0}")]
    Durability(String),

    #[error("Schema not found: {name} version {version}")]
    NotFound { name: String, version: String },

    #[error("Version minting failed: {0}")]
    VersionMint(String),
}
