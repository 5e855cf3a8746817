//! Out-of-band block mutation.
//!
//! [`tamper`] rewrites one block in place and rehashes only that block. It
//! exists to show that the edit is caught by [`crate::validate::validate`]
//! at the following link. It is not part of the normal write path.

use crate::block::Block;
use crate::chain::Chain;
use crate::error::{LedgerError, Result};

/// Replacement values for a tampered block. Empty or blank values leave the
/// field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TamperEdit {
    pub candidate: Option<String>,
    pub voter_id: Option<String>,
}

impl TamperEdit {
    pub fn candidate(candidate: impl Into<String>) -> Self {
        Self {
            candidate: Some(candidate.into()),
            voter_id: None,
        }
    }

    pub fn voter_id(voter_id: impl Into<String>) -> Self {
        Self {
            candidate: None,
            voter_id: Some(voter_id.into()),
        }
    }

    fn normalized(&self) -> (Option<&str>, Option<&str>) {
        (non_blank(&self.candidate), non_blank(&self.voter_id))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Overwrite block `index` with `edit` and recompute that block's hash only.
///
/// Later blocks keep their old `previous_hash`, so the chain becomes invalid
/// at `index + 1`. Editing the last block leaves the links intact.
///
/// Fails with [`LedgerError::InvalidTarget`] for genesis or an out-of-range
/// index and with [`LedgerError::NoChangeRequested`] for an empty edit; the
/// chain is untouched on error.
pub fn tamper(chain: &mut Chain, index: usize, edit: &TamperEdit) -> Result<Block> {
    let len = chain.len();
    if index < 1 || index >= len {
        return Err(LedgerError::InvalidTarget { index, len });
    }
    let (candidate, voter_id) = edit.normalized();
    if candidate.is_none() && voter_id.is_none() {
        return Err(LedgerError::NoChangeRequested);
    }

    let block = chain
        .block_mut(index)
        .ok_or(LedgerError::InvalidTarget { index, len })?;
    if let Some(candidate) = candidate {
        block.candidate = candidate.to_string();
    }
    if let Some(voter_id) = voter_id {
        block.voter_id = voter_id.to_string();
    }
    block.hash = block.compute_hash();

    tracing::warn!(
        index,
        candidate = %block.candidate,
        voter_id = %block.voter_id,
        hash = %block.hash,
        "block tampered; later links not updated"
    );
    Ok(block.clone())
}
