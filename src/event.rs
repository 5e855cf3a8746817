use crate::block::{now_timestamp, Block};
use crate::chain::Chain;
use crate::error::{LedgerError, Result};
use crate::tally::{summarize, TallyReport};
use crate::validate::{validate, ValidityReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named vote with a fixed candidate list and its own chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub event_id: String,
    pub name: String,
    /// Fixed at creation.
    pub candidates: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub candidate_descriptions: BTreeMap<String, String>,
    /// Candidate image file names. Not managed here, only carried through
    /// so stores written by other tools keep them.
    #[serde(default)]
    pub candidate_images: BTreeMap<String, String>,
    pub blockchain: Chain,
}

/// Split a comma-separated candidate list, trimming entries and dropping empties.
pub fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Event {
    /// Create an event whose chain starts with a fresh genesis block.
    pub fn new(name: &str, candidates: Vec<String>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if candidates.is_empty() {
            return Err(LedgerError::NoCandidates);
        }

        let event = Self {
            event_id: format!("event-{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            candidates,
            created_at: now_timestamp(),
            candidate_descriptions: BTreeMap::new(),
            candidate_images: BTreeMap::new(),
            blockchain: Chain::new(),
        };
        tracing::info!(event_id = %event.event_id, name = %event.name, "created event");
        Ok(event)
    }

    /// Whether `candidate` is on the declared list.
    pub fn is_candidate(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    /// Whether `voter_id` already has a vote on this event's chain.
    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.blockchain.has_voted(voter_id)
    }

    /// Record a vote, enforcing one vote per voter and a declared candidate.
    pub fn cast_vote(&mut self, voter_id: &str, candidate: &str) -> Result<Block> {
        if self.has_voted(voter_id) {
            return Err(LedgerError::AlreadyVoted(voter_id.into()));
        }
        if !self.is_candidate(candidate) {
            return Err(LedgerError::UnknownCandidate(candidate.into()));
        }
        let block = self.blockchain.append(voter_id, candidate)?.clone();
        tracing::info!(event_id = %self.event_id, index = block.index, "vote recorded");
        Ok(block)
    }

    /// Set a candidate's description; blank text removes it.
    pub fn set_description(&mut self, candidate: &str, text: &str) -> Result<()> {
        if !self.is_candidate(candidate) {
            return Err(LedgerError::UnknownCandidate(candidate.into()));
        }
        let text = text.trim();
        if text.is_empty() {
            self.candidate_descriptions.remove(candidate);
        } else {
            self.candidate_descriptions
                .insert(candidate.into(), text.into());
        }
        Ok(())
    }

    /// Check the integrity of this event's chain.
    pub fn validate(&self) -> ValidityReport {
        validate(&self.blockchain)
    }

    /// Tally this event's votes against its candidates.
    pub fn summary(&self) -> TallyReport {
        summarize(&self.candidates, &self.blockchain)
    }
}
