use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid target block {index} (chain length {len}; genesis is protected)")]
    InvalidTarget { index: usize, len: usize },

    #[error("No change requested: provide a new candidate and/or voter id")]
    NoChangeRequested,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Event already exists: {0}")]
    EventExists(String),

    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),

    #[error("Voter has already voted in this event: {0}")]
    AlreadyVoted(String),

    #[error("Event name must not be empty")]
    EmptyName,

    #[error("Event needs at least one candidate")]
    NoCandidates,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
