use crate::chain::Chain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Votes received by one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCount {
    pub candidate: String,
    pub votes: usize,
}

/// Aggregated results of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyReport {
    /// Every declared candidate, in declaration order, including those with zero votes.
    pub counts: Vec<CandidateCount>,
    pub total: usize,
    /// Candidates sharing the highest count; empty when nobody has voted.
    pub winners: Vec<String>,
}

impl TallyReport {
    /// Votes for `candidate`, or `None` if it was never declared.
    pub fn count(&self, candidate: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.candidate == candidate)
            .map(|c| c.votes)
    }
}

impl fmt::Display for TallyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.counts {
            writeln!(f, "{:<20} {}", c.candidate, c.votes)?;
        }
        writeln!(f, "Total: {}", self.total)?;
        if self.winners.is_empty() {
            writeln!(f, "Winner: (none)")?;
        } else {
            writeln!(f, "Winner: {}", self.winners.join(", "))?;
        }
        Ok(())
    }
}

/// Count the votes on `chain` for the declared `candidates`.
///
/// Genesis is skipped, and blocks naming an undeclared candidate are ignored.
pub fn summarize(candidates: &[String], chain: &Chain) -> TallyReport {
    let mut counts: Vec<CandidateCount> = Vec::with_capacity(candidates.len());
    for name in candidates {
        if !counts.iter().any(|c| &c.candidate == name) {
            counts.push(CandidateCount {
                candidate: name.clone(),
                votes: 0,
            });
        }
    }

    for block in chain.votes() {
        if let Some(entry) = counts.iter_mut().find(|c| c.candidate == block.candidate) {
            entry.votes += 1;
        }
    }

    let total = counts.iter().map(|c| c.votes).sum();
    let max_votes = counts.iter().map(|c| c.votes).max().unwrap_or(0);
    let winners = if max_votes > 0 {
        counts
            .iter()
            .filter(|c| c.votes == max_votes)
            .map(|c| c.candidate.clone())
            .collect()
    } else {
        Vec::new()
    };

    TallyReport {
        counts,
        total,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_winner() {
        let mut chain = Chain::new();
        chain.append("v1", "Alice").unwrap();
        chain.append("v2", "Bob").unwrap();
        chain.append("v3", "Alice").unwrap();

        let report = summarize(&names(&["Alice", "Bob", "Carol"]), &chain);
        assert_eq!(report.count("Alice"), Some(2));
        assert_eq!(report.count("Bob"), Some(1));
        assert_eq!(report.count("Carol"), Some(0));
        assert_eq!(report.total, 3);
        assert_eq!(report.winners, vec!["Alice"]);
    }

    #[test]
    fn no_votes_no_winners() {
        let report = summarize(&names(&["Alice", "Bob"]), &Chain::new());
        assert!(report.counts.iter().all(|c| c.votes == 0));
        assert_eq!(report.counts.len(), 2);
        assert_eq!(report.total, 0);
        assert!(report.winners.is_empty());
    }

    #[test]
    fn ties_keep_all_leaders_in_order() {
        let mut chain = Chain::new();
        chain.append("v1", "Carol").unwrap();
        chain.append("v2", "Alice").unwrap();
        let report = summarize(&names(&["Alice", "Bob", "Carol"]), &chain);
        assert_eq!(report.winners, vec!["Alice", "Carol"]);
    }

    #[test]
    fn unknown_candidates_ignored() {
        let mut chain = Chain::new();
        chain.append("v1", "Alice").unwrap();
        chain.append("v2", "Zed").unwrap();
        let report = summarize(&names(&["Alice", "Bob"]), &chain);
        assert_eq!(report.total, 1);
        assert_eq!(report.count("Zed"), None);
    }

    #[test]
    fn genesis_never_counted() {
        let report = summarize(&names(&["-"]), &Chain::new());
        assert_eq!(report.total, 0);
    }

    #[test]
    fn counts_keep_declaration_order() {
        let report = summarize(&names(&["Zed", "Alice", "Zed"]), &Chain::new());
        let order: Vec<_> = report.counts.iter().map(|c| c.candidate.as_str()).collect();
        assert_eq!(order, vec!["Zed", "Alice"]);
    }
}
