use crate::chain::Chain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a chain stopped linking up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakReason {
    /// Block 0 does not have `index == 0` and `previous_hash == "0"`.
    MalformedGenesis,
    /// `previous_hash` differs from the prior block's `hash`.
    PreviousHashMismatch,
    /// Stored `hash` differs from the digest of the block's fields.
    HashMismatch,
}

/// Outcome of walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityReport {
    pub valid: bool,
    /// First index at which the chain is broken.
    pub broken_at: Option<usize>,
    pub reason: Option<BreakReason>,
}

impl ValidityReport {
    fn ok() -> Self {
        Self {
            valid: true,
            broken_at: None,
            reason: None,
        }
    }

    fn broken(index: usize, reason: BreakReason) -> Self {
        Self {
            valid: false,
            broken_at: Some(index),
            reason: Some(reason),
        }
    }
}

impl fmt::Display for ValidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.broken_at, self.reason) {
            (Some(i), Some(reason)) => {
                let what = match reason {
                    BreakReason::MalformedGenesis => "malformed genesis block",
                    BreakReason::PreviousHashMismatch => "previous_hash does not match prior block",
                    BreakReason::HashMismatch => "stored hash does not match block contents",
                };
                write!(f, "INVALID at block {}: {}", i, what)
            }
            _ => write!(f, "VALID"),
        }
    }
}

/// Walk `chain` and report the first broken link, if any.
///
/// Genesis is checked first, then blocks 1.. in order; the walk stops at the
/// first failure. An empty chain is valid.
pub fn validate(chain: &Chain) -> ValidityReport {
    let blocks = chain.blocks();
    let Some(genesis) = blocks.first() else {
        return ValidityReport::ok();
    };

    let report = if !genesis.is_genesis() {
        ValidityReport::broken(0, BreakReason::MalformedGenesis)
    } else {
        blocks
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| {
                let (prev, current) = (&pair[0], &pair[1]);
                if current.previous_hash != prev.hash {
                    Some(ValidityReport::broken(i + 1, BreakReason::PreviousHashMismatch))
                } else if !current.verify() {
                    Some(ValidityReport::broken(i + 1, BreakReason::HashMismatch))
                } else {
                    None
                }
            })
            .unwrap_or_else(ValidityReport::ok)
    };

    if report.valid {
        tracing::debug!(blocks = blocks.len(), "chain valid");
    } else {
        tracing::warn!(broken_at = ?report.broken_at, reason = ?report.reason, "chain invalid");
    }
    report
}
