use crate::block::{now_timestamp, Block};
use crate::error::{LedgerError, Result};
use crate::hash::BlockHash;
use serde::{Deserialize, Serialize};

/// Ordered, append-only sequence of blocks for one event.
///
/// Serializes as a plain JSON array. Blocks are readable through
/// [`Chain::blocks`]; the only ways to change a chain are [`Chain::append`]
/// and the out-of-band [`crate::tamper::tamper`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
}

/// Create a fresh genesis block.
pub fn create_genesis() -> Block {
    Block::genesis()
}

impl Chain {
    /// A chain holding a single fresh genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![create_genesis()],
        }
    }

    /// Wrap blocks loaded from elsewhere. No checks are made; run
    /// [`crate::validate::validate`] to find out whether they link up.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Append a vote stamped with the current time.
    pub fn append(&mut self, voter_id: &str, candidate: &str) -> Result<&Block> {
        self.append_with_timestamp(voter_id, candidate, now_timestamp())
    }

    /// Append a vote with an explicit timestamp (for testing / determinism).
    ///
    /// An empty chain gets a genesis block first. Candidate membership and
    /// duplicate voters are not checked here. Fails with
    /// [`LedgerError::InvalidTarget`], leaving the chain untouched, when the
    /// last index is `u64::MAX`.
    pub fn append_with_timestamp(
        &mut self,
        voter_id: &str,
        candidate: &str,
        timestamp: String,
    ) -> Result<&Block> {
        if self.blocks.is_empty() {
            tracing::warn!("appending to an empty chain; inserting genesis first");
            self.blocks.push(create_genesis());
        }
        let len = self.blocks.len();
        let block = Block::next(&self.blocks[len - 1], voter_id.into(), candidate.into(), timestamp)
            .ok_or(LedgerError::InvalidTarget { index: len, len })?;
        tracing::debug!(index = block.index, hash = %block.hash, "appended block");
        self.blocks.push(block);
        Ok(&self.blocks[len])
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Non-genesis blocks, in chain order.
    pub fn votes(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.index != 0)
    }

    /// Block at position `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chain has no blocks at all, not even genesis.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Hash of the last block; an external verifier can pin this to detect
    /// edits to the head that no later link would expose.
    pub fn head_hash(&self) -> Option<&BlockHash> {
        self.blocks.last().map(|b| &b.hash)
    }

    /// Whether `voter_id` appears on any non-genesis block.
    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.votes().any(|b| b.voter_id == voter_id)
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chain_has_genesis() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert!(chain.blocks()[0].is_genesis());
        assert_eq!(chain.votes().count(), 0);
    }

    #[test]
    fn append_links_blocks() {
        let mut chain = Chain::new();
        let h1 = chain.append("alice", "Bob").unwrap().hash.clone();
        let b2 = chain.append("carol", "Dave").unwrap().clone();
        assert_eq!(chain.len(), 3);
        assert_eq!(b2.index, 2);
        assert_eq!(b2.previous_hash, h1);
        assert_eq!(chain.head_hash(), Some(&b2.hash));
    }

    #[test]
    fn append_does_not_rewrite_earlier_blocks() {
        let mut chain = Chain::new();
        chain.append("alice", "Bob").unwrap();
        let before = chain.blocks()[..2].to_vec();
        chain.append("carol", "Bob").unwrap();
        assert_eq!(&chain.blocks()[..2], &before[..]);
    }

    #[test]
    fn empty_chain_self_heals() {
        let mut chain = Chain::default();
        assert!(chain.is_empty());
        let b = chain.append("alice", "Bob").unwrap().clone();
        assert_eq!(chain.len(), 2);
        assert!(chain.blocks()[0].is_genesis());
        assert_eq!(b.index, 1);
        assert_eq!(b.previous_hash, chain.blocks()[0].hash);
    }

    #[test]
    fn append_refuses_index_overflow() {
        let genesis = Block::genesis();
        let mut last = Block::next(&genesis, "v1".into(), "A".into(), now_timestamp()).unwrap();
        last.index = u64::MAX;
        last.hash = last.compute_hash();
        let mut chain = Chain::from_blocks(vec![genesis, last]);
        assert!(crate::validate::validate(&chain).valid);

        let before = chain.clone();
        let err = chain.append("w", "A").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTarget { index: 2, len: 2 }));
        assert_eq!(chain, before);
        assert!(!chain.has_voted("w"));
    }

    #[test]
    fn has_voted_ignores_genesis() {
        let mut chain = Chain::new();
        assert!(!chain.has_voted("GENESIS"));
        chain.append("alice", "Bob").unwrap();
        assert!(chain.has_voted("alice"));
        assert!(!chain.has_voted("bob"));
    }

    #[test]
    fn serializes_as_array() {
        let mut chain = Chain::new();
        chain.append("alice", "Bob").unwrap();
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(json.as_array().map(|a| a.len()), Some(2));
        let back: Chain = serde_json::from_value(json).unwrap();
        assert_eq!(back, chain);
    }
}
