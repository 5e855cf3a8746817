use sha2::{Digest, Sha256};

/// SHA-256 digest as a 64-char lowercase hex string.
pub type BlockHash = String;

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Digest of a block's five hashed fields, concatenated in order with no
/// delimiters.
pub fn block_hash(
    index: u64,
    timestamp: &str,
    voter_id: &str,
    candidate: &str,
    previous_hash: &str,
) -> BlockHash {
    let payload = format!("{}{}{}{}{}", index, timestamp, voter_id, candidate, previous_hash);
    compute_hash(payload.as_bytes())
}
