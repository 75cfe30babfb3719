//! Core domain types for voxpad.
//!
//! This crate holds the pieces of the system that have no adapter
//! dependencies: the single-slot [`job::JobTracker`], the persisted
//! [`history::HistoryStore`], and the artifact naming rules in [`naming`].
//! Speech engines and HTTP live in `voxpad-voice` and `voxpad-axum`.

pub mod history;
pub mod job;
pub mod naming;

pub use history::{HistoryEntry, HistoryStore};
pub use job::{JobKind, JobState, JobStatus, JobTracker, TrackerError};
pub use naming::{ARTIFACT_EXT, artifact_filename, sanitize_base};
