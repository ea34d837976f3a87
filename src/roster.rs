use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::program::UNKNOWN_PROGRAM;
use crate::services::gradebook_api::SubmissionRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

/// Maps SIS user IDs (U-numbers) to declared majors for one course.
///
/// Stored as the plain JSON object the roster upload produces:
/// ```json
/// {
///   "U12345678": { "name": "Ada Lovelace", "major": "Computer Science" },
///   "U87654321": { "name": "Alan Turing", "major": "[6M]Cybersecurity" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: HashMap<String, RosterEntry>,
}

impl Roster {
    /// Loads a roster from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roster file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("roster file {} is not a valid roster", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, sis_user_id: impl Into<String>, entry: RosterEntry) {
        self.entries.insert(sis_user_id.into(), entry);
    }

    /// Returns the raw major for `sis_user_id`, if the student is listed with one.
    pub fn major_for(&self, sis_user_id: &str) -> Option<&str> {
        self.entries
            .get(sis_user_id)
            .and_then(|e| e.major.as_deref())
            .filter(|m| !m.is_empty())
    }

    /// Stamps every submission with its roster major. Submissions without an
    /// SIS id, or whose student is not on the roster, get [`UNKNOWN_PROGRAM`].
    pub fn apply(&self, submissions: &mut [SubmissionRecord]) {
        for s in submissions {
            let major = s
                .sis_user_id
                .as_deref()
                .and_then(|uid| self.major_for(uid))
                .unwrap_or(UNKNOWN_PROGRAM);
            s.major = Some(major.to_string());
        }
    }
}
