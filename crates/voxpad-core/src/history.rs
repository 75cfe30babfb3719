//! Persisted synthesis history.
//!
//! An append-only, newest-first log of completed synthesis jobs, backed by
//! a single JSON file. Every prepend rewrites the whole file — simple
//! write-through semantics that are perfectly adequate for a single-user
//! tool where a handful of entries accrue per session. Synthesis jobs are
//! already serialized by the job tracker, so at most one writer touches
//! the backing file at a time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Input text longer than this is truncated before persistence.
///
/// A privacy/size safeguard, not a display nicety: the full text never
/// reaches disk.
const MAX_EXCERPT_CHARS: usize = 200;

/// One completed synthesis job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Generated audio artifact identifier.
    pub filename: String,
    /// Input text, truncated to 200 characters.
    pub text: String,
    /// Selected voice identifier (opaque to this crate).
    pub voice: String,
    /// Completion wall-clock time, formatted as a sortable string.
    pub timestamp: String,
}

impl HistoryEntry {
    /// Build an entry for a job that completed at `when`.
    ///
    /// Applies the excerpt truncation; callers pass the full input text.
    #[must_use]
    pub fn new(filename: String, text: &str, voice: String, when: DateTime<Local>) -> Self {
        Self {
            filename,
            text: text.chars().take(MAX_EXCERPT_CHARS).collect(),
            voice,
            timestamp: when.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Newest-first history of synthesis jobs, persisted to a JSON file.
///
/// The store owns the in-memory ordered sequence and is the sole writer
/// to the backing file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Open the store, reading the persisted sequence if the file exists.
    ///
    /// A missing file initializes an empty history; a present-but-invalid
    /// file is an error, not silently discarded.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(io::Error::other)?
        } else {
            Vec::new()
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "History loaded");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `entry` at the front and synchronously rewrite the backing
    /// file. The entry is durable when this returns.
    pub fn prepend(&self, entry: HistoryEntry) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(0, entry);
        let json = serde_json::to_string_pretty(&*entries).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }

    /// The full ordered sequence, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
