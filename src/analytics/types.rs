//! Data types produced by the aggregation pipeline.

use serde::Serialize;
use std::fmt;

use crate::analytics::utility::{average, pct};
use crate::services::gradebook_api::SubmissionRecord;

/// Points assumed when an assignment does not report its maximum score.
pub const DEFAULT_POINTS_POSSIBLE: f64 = 100.0;

/// Display status of a submission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionStatus {
    Graded,
    Submitted,
    Pending,
}

impl SubmissionStatus {
    pub fn of(record: &SubmissionRecord) -> Self {
        if record.workflow_state.as_deref() == Some("graded") {
            SubmissionStatus::Graded
        } else if record.submitted {
            SubmissionStatus::Submitted
        } else {
            SubmissionStatus::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Graded => "Graded",
            SubmissionStatus::Submitted => "Submitted",
            SubmissionStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated grades for one normalized academic program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramGroup {
    pub program: String,
    /// Every submission mapped to this program.
    pub students: usize,
    /// Submissions carrying a score.
    pub graded: usize,
    pub score_sum: f64,
    /// Graded submissions scoring at least 70% of possible points.
    pub at_or_above_70: usize,
    /// Graded submissions scoring at least 80% of possible points.
    pub at_or_above_80: usize,
}

impl ProgramGroup {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            students: 0,
            graded: 0,
            score_sum: 0.0,
            at_or_above_70: 0,
            at_or_above_80: 0,
        }
    }

    /// Mean score over graded submissions; `None` when nothing is graded.
    pub fn average(&self) -> Option<f64> {
        average(self.score_sum, self.graded)
    }

    pub fn pass_rate_70(&self) -> f64 {
        pct(self.at_or_above_70, self.graded)
    }

    pub fn pass_rate_80(&self) -> f64 {
        pct(self.at_or_above_80, self.graded)
    }
}
