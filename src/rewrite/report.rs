//! Per-commit outcomes and the end-of-run summary.

use tracing::{info, warn};

/// What happened to one selected commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The commit now carries its generated message; `new_tip` is the
    /// branch tip after the rebase.
    Rewritten { new_tip: String },
    /// Left untouched, either before or during the rewrite.
    Skipped { reason: String },
    /// A git step failed; the commit keeps its original message.
    Failed { error: String },
}

/// Outcomes of a run, keyed by original commit sha.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    entries: Vec<(String, RewriteOutcome)>,
}

impl RunReport {
    pub fn record(&mut self, sha: impl Into<String>, outcome: RewriteOutcome) {
        self.entries.push((sha.into(), outcome));
    }

    /// Append every entry of `other`, keeping its order.
    pub fn merge(&mut self, other: RunReport) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[(String, RewriteOutcome)] {
        &self.entries
    }

    pub fn outcome(&self, sha: &str) -> Option<&RewriteOutcome> {
        self.entries
            .iter()
            .find(|(s, _)| s == sha)
            .map(|(_, outcome)| outcome)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rewritten(&self) -> usize {
        self.count(|o| matches!(o, RewriteOutcome::Rewritten { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RewriteOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RewriteOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RewriteOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| pred(o)).count()
    }

    /// Emit one line per commit that was not rewritten, then the totals.
    pub fn log_summary(&self) {
        for (sha, outcome) in &self.entries {
            match outcome {
                RewriteOutcome::Rewritten { .. } => {}
                RewriteOutcome::Skipped { reason } => warn!("Skipped {}: {}", short(sha), reason),
                RewriteOutcome::Failed { error } => warn!("Failed {}: {}", short(sha), error),
            }
        }
        info!(
            rewritten = self.rewritten(),
            skipped = self.skipped(),
            failed = self.failed(),
            "Run finished"
        );
    }
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
