//! Append-only, hash-linked vote ledger.
//!
//! Each [`event::Event`] owns one [`chain::Chain`] that starts with a genesis
//! block and grows by one block per vote. [`validate::validate`] recomputes
//! every link, [`tally::summarize`] counts the votes, and
//! [`tamper::tamper`] rewrites a block out-of-band to show that the next link
//! breaks.
//!
//! Everything here is synchronous and holds no global state. Callers own a
//! chain for the duration of one operation and must serialize writes per
//! event.

pub mod block;
pub mod chain;
pub mod error;
pub mod event;
pub mod export;
pub mod hash;
pub mod storage;
pub mod tally;
pub mod tamper;
pub mod validate;

pub use block::Block;
pub use chain::{create_genesis, Chain};
pub use error::{LedgerError, Result};
pub use event::Event;
pub use tally::{summarize, TallyReport};
pub use tamper::{tamper, TamperEdit};
pub use validate::{validate, ValidityReport};
