//! Batch summary: counts per terminal state plus wall time.
//!
//! Built once all items have reached a terminal state. Serializable so the
//! CLI can write it out as JSON.

use crate::processing::pipeline::{ClipOutcome, ClipReport};

use serde::{Serialize, Serializer};

use std::time::Duration;

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub planned: usize,
    pub cancelled: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// One entry per failed item, in descriptor order.
    pub failures: Vec<FailureRecord>,
}

/// A failed item as it appears in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub line_number: usize,
    pub video_name: Option<String>,
    pub stage: &'static str,
    pub message: String,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl BatchSummary {
    /// Tallies the outcomes of a finished batch.
    #[must_use]
    pub fn from_reports(reports: &[ClipReport], elapsed: Duration) -> Self {
        let mut summary = Self {
            total: reports.len(),
            elapsed,
            ..Self::default()
        };
        for report in reports {
            match &report.outcome {
                ClipOutcome::Succeeded { .. } => summary.succeeded += 1,
                ClipOutcome::Skipped(_) => summary.skipped += 1,
                ClipOutcome::Planned { .. } => summary.planned += 1,
                ClipOutcome::Cancelled => summary.cancelled += 1,
                ClipOutcome::Failed(e) => {
                    summary.failed += 1;
                    summary.failures.push(FailureRecord {
                        line_number: report.line_number,
                        video_name: report.video_name.clone(),
                        stage: e.stage(),
                        message: e.to_string(),
                    });
                }
            }
        }
        summary
    }

    /// True when no item failed. Skips and cancellations do not count as failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
