use crate::hash::{block_hash, BlockHash};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Voter id recorded on every genesis block.
pub const GENESIS_VOTER: &str = "GENESIS";
/// Candidate placeholder recorded on every genesis block.
pub const GENESIS_CANDIDATE: &str = "-";
/// `previous_hash` of a genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One link in a vote chain: either the genesis sentinel or a recorded vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Position in the chain; 0 is genesis.
    pub index: u64,
    /// ISO-8601 creation time, hashed as the literal string.
    pub timestamp: String,
    pub voter_id: String,
    pub candidate: String,
    /// Hash of the prior block (`"0"` for genesis).
    pub previous_hash: BlockHash,
    /// Hash over the five fields above.
    pub hash: BlockHash,
}

impl Block {
    /// Create a genesis block stamped with the current time.
    pub fn genesis() -> Self {
        Self::genesis_with_timestamp(now_timestamp())
    }

    /// Create a genesis block with an explicit timestamp (for testing / determinism).
    pub fn genesis_with_timestamp(timestamp: String) -> Self {
        Self::build(
            0,
            timestamp,
            GENESIS_VOTER.into(),
            GENESIS_CANDIDATE.into(),
            GENESIS_PREVIOUS_HASH.into(),
        )
    }

    /// Create the block that follows `prev`, linked to its hash. `None` when
    /// `prev.index` is already `u64::MAX`.
    pub(crate) fn next(
        prev: &Block,
        voter_id: String,
        candidate: String,
        timestamp: String,
    ) -> Option<Self> {
        let index = prev.index.checked_add(1)?;
        Some(Self::build(index, timestamp, voter_id, candidate, prev.hash.clone()))
    }

    fn build(
        index: u64,
        timestamp: String,
        voter_id: String,
        candidate: String,
        previous_hash: BlockHash,
    ) -> Self {
        let hash = block_hash(index, &timestamp, &voter_id, &candidate, &previous_hash);
        Self {
            index,
            timestamp,
            voter_id,
            candidate,
            previous_hash,
            hash,
        }
    }

    /// Recompute the digest from the block's current fields.
    pub fn compute_hash(&self) -> BlockHash {
        block_hash(
            self.index,
            &self.timestamp,
            &self.voter_id,
            &self.candidate,
            &self.previous_hash,
        )
    }

    /// Whether the stored hash matches the block's own fields.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Whether this block has the genesis shape (`index == 0`, `previous_hash == "0"`).
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

/// Current UTC time rendered as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
