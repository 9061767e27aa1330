//! Schema Registry
//!
//! A versioned, append-only schema registry: clients register named schema
//! definitions and retrieve them later by name and version. New values are
//! staged in memory as proposals, then durably committed to an append-only
//! SQLite log where they become visible for lookup.
//!
//! ## Features
//!
//! - **Propose/commit staging**: at most one pending proposal per name;
//!   commits are atomic with respect to racing callers
//! - **Immutable storage**: committed records are never updated or deleted
//! - **Checksum validation**: SHA256 checksums ensure data integrity
//! - **Consensus seam**: the agreement strategy between staging and the
//!   durable append is pluggable, for a future multi-node deployment
//!
//! ## Architecture
//!
//! ```text
//! POST /schemas ──> propose ──> [proposal cache]  (in memory, per name)
//!                      │
//!                   commit ──> accept ──> mint ──> [append-only log]
//!                                                     │
//! GET /schemas/{name} ────────────────────────────────┤
//! GET /schemas/{name}/versions/{version} ─────────────┘
//! ```

pub mod checksum;
pub mod config;
pub mod consensus;
pub mod error;
pub mod log;
pub mod proposal;
pub mod schema;
pub mod server;
pub mod store;
pub mod version;

pub use checksum::Checksum;
pub use config::{RegistryConfig, ServerConfig, StorageConfig};
pub use consensus::{Consensus, LocalConsensus};
pub use error::{RegistryError, Result};
pub use log::SchemaLog;
pub use proposal::ProposalCache;
pub use schema::SchemaRecord;
pub use server::HttpServer;
pub use store::{SqlStore, Storage};
pub use version::{UuidAssigner, VersionAssigner, VersionId};
