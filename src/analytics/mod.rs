//! Grade aggregation.
//!
//! Groups submissions by normalized academic program (for the roster-based
//! program table and CSV export) and by course section (the grades-only
//! analytics the backends serve).

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate_by_program, aggregate_by_section, effective_points};
pub use types::{DEFAULT_POINTS_POSSIBLE, ProgramGroup, SubmissionStatus};
