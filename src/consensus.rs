//! Agreement strategy between staging and durable append

use crate::error::Result;

/// Strategy consulted by commit after a proposal is read from the cache
/// and before it is durably appended.
///
/// A multi-node implementation broadcasts the proposal and returns once a
/// quorum has acknowledged it. Rejection leaves the proposal staged, so
/// the caller may retry the commit.
pub trait Consensus: Send + Sync {
    /// Accept `content` as the next committed value for `name`
    fn accept(&self, name: &str, content: &str) -> Result<()>;
}

/// Single-node strategy: every proposal is accepted immediately
pub struct LocalConsensus;

impl Consensus for LocalConsensus {
    fn accept(&self, _name: &str, _content: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_consensus_accepts() {
        assert!(LocalConsensus.accept("user", "content").is_ok());
    }
}
