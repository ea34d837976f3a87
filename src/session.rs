//! Explicit session state handed to every page controller.
//!
//! Holds the Canvas token and the per-course rosters. The state lives in
//! memory behind an `RwLock` and can optionally be persisted to a JSON file so
//! separate CLI invocations share one sign-in.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::roster::Roster;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    /// Keyed by course id.
    #[serde(default)]
    rosters: HashMap<String, Roster>,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    path: Option<PathBuf>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    /// A session that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the session file at `path`. A missing file yields an empty
    /// session bound to that path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read session file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("session file {} is corrupt", path.display()))?
        } else {
            SessionState::default()
        };
        debug!(path = %path.display(), signed_in = state.token.is_some(), "Session opened");

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Stores a trimmed token. Blank tokens are rejected and leave the session
    /// unchanged.
    pub fn set_token(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        self.write().token = Some(token.to_string());
        true
    }

    pub fn clear_token(&self) {
        self.write().token = None;
    }

    pub fn roster(&self, course_id: u64) -> Option<Roster> {
        self.read().rosters.get(&course_id.to_string()).cloned()
    }

    pub fn set_roster(&self, course_id: u64, roster: Roster) {
        self.write().rosters.insert(course_id.to_string(), roster);
    }

    /// Drops the token and every roster.
    pub fn clear(&self) {
        *self.write() = SessionState::default();
    }

    /// Writes the session to its file, creating parent directories. In-memory
    /// sessions are left alone.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.read())?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session file {}", path.display()))?;
        debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
