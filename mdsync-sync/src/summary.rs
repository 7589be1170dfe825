//! Run summary: pure aggregation over per-document outcomes.

use serde::Serialize;

use crate::reconcile::SyncOutcome;

/// A document that failed, as shown in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub title: String,
    pub error: String,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub success_count: usize,
    pub failures: Vec<FailedDocument>,
}

impl RunSummary {
    /// A run succeeds only when no document failed, even if others synced.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status for this run.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Summarise outcomes, preserving failure order.
pub fn summarize(outcomes: &[SyncOutcome]) -> RunSummary {
    let failures: Vec<FailedDocument> = outcomes
        .iter()
        .filter(|o| !o.success)
        .map(|o| FailedDocument {
            title: o.title.clone(),
            error: o.error.clone().unwrap_or_else(|| "unknown error".to_string()),
        })
        .collect();

    RunSummary {
        total: outcomes.len(),
        success_count: outcomes.len() - failures.len(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(title: &str, error: Option<&str>) -> SyncOutcome {
        SyncOutcome {
            path: format!("{title}.md"),
            title: title.to_string(),
            success: error.is_none(),
            error: error.map(str::to_string),
            action: None,
            dropped_blocks: 0,
        }
    }

    #[test]
    fn empty_run_is_successful() {
        let summary = summarize(&[]);
        assert!(summary.is_success());
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn any_failure_fails_the_run() {
        let summary = summarize(&[
            outcome("A", None),
            outcome("B", Some("rate limited")),
            outcome("C", None),
        ]);
        assert_eq!(summary.success_count, 2);
        assert_eq!(
            summary.failures,
            vec![FailedDocument {
                title: "B".into(),
                error: "rate limited".into(),
            }]
        );
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), 1);
    }
}
