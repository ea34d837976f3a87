//! Page controllers.
//!
//! Each controller is built from an API handle and the explicit
//! [`SessionContext`]. A load issues its requests concurrently and settles into
//! a [`PageState`]: either everything required arrived, or the page failed as
//! a whole. Nothing is retried automatically.

pub mod assignments;
pub mod courses;
pub mod grading;
pub mod submissions;

pub use assignments::{AssignmentsController, AssignmentsPage};
pub use courses::CoursesController;
pub use grading::GradingController;
pub use submissions::{SubmissionsController, SubmissionsPage};

use crate::error::ApiError;
use crate::session::SessionContext;
use tracing::{error, warn};

/// Outcome of loading (or acting on) a page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Ready(T),
    /// User-facing message; prior session state is left untouched.
    Failed(String),
    /// No token, or the backend rejected it. The token has been cleared.
    SignedOut,
}

impl<T> PageState<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PageState<U> {
        match self {
            PageState::Ready(v) => PageState::Ready(f(v)),
            PageState::Failed(msg) => PageState::Failed(msg),
            PageState::SignedOut => PageState::SignedOut,
        }
    }
}

/// Turns an API result into a page state, clearing the stored token when the
/// backend rejects it.
pub(crate) fn settle<T>(
    session: &SessionContext,
    what: &str,
    result: Result<T, ApiError>,
) -> PageState<T> {
    match result {
        Ok(value) => PageState::Ready(value),
        Err(e) if e.is_auth_failure() => {
            warn!(error = %e, "Token rejected, signing out");
            session.clear_token();
            PageState::SignedOut
        }
        Err(e) => {
            error!(error = %e, what, "Page load failed");
            PageState::Failed(format!("Failed to load {what}: {e}"))
        }
    }
}
