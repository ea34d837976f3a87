//! Declarative page views.
//!
//! Each page maps its loaded model to a list of [`Node`]s; [`render_text`]
//! turns nodes into terminal output. Views never fetch or aggregate: they only
//! format what the controllers and [`crate::analytics`] already computed.

pub mod assignments;
pub mod courses;
pub mod grading;
pub mod node;
pub mod submissions;

pub use node::{Node, Table, render_text};

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// Placeholder for empty cells.
pub const EMPTY_CELL: &str = "—";

/// `Oct 5, 2024` in the viewer's local time zone.
pub fn format_day(at: &DateTime<Utc>) -> String {
    format_day_in(&at.with_timezone(&Local))
}

/// `Oct 5, 2024 3:59 PM` in the viewer's local time zone.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    format_timestamp_in(&at.with_timezone(&Local))
}

fn format_day_in<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%b %-d, %Y").to_string()
}

fn format_timestamp_in<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%b %-d, %Y %-I:%M %p").to_string()
}
