//! Direct access to the Canvas LMS REST API.
//!
//! Canvas paginates every list endpoint through `Link` headers and does not
//! put SIS ids or section names on submissions, so this client walks all pages
//! and joins submissions against enrollments and sections itself.

mod client;
mod join;

pub use client::{CanvasClient, DEFAULT_CANVAS_BASE_URL};
pub use join::{RawEnrollment, RawSection, RawSubmission, RawUser, join_submissions};
