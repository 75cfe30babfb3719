//! Single-slot job status tracking.
//!
//! The tracker keeps exactly one mutable status record per [`JobKind`].
//! Starting a job is the only admission-control rule in the system: a
//! second start while a record is `Running` is rejected outright, never
//! queued. Completions overwrite the record; superseded runs leave no
//! trace here (synthesis results are remembered in the history store).
//!
//! # Locking discipline
//!
//! Each record is guarded by its own `std::sync::Mutex`, held only for the
//! duration of a field update or snapshot clone — never across an `.await`
//! point. A poisoned lock is recovered via [`PoisonError::into_inner`]; the
//! record itself is always left in a consistent state by the methods below.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// The two kinds of background work voxpad runs.
///
/// Each kind has an independent status record; a synthesis and a
/// transcription may be in flight at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Text-to-speech generation producing an audio artifact.
    Synthesis,
    /// Speech-to-text decoding of an uploaded audio file.
    Transcription,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synthesis => write!(f, "synthesis"),
            Self::Transcription => write!(f, "transcription"),
        }
    }
}

/// Lifecycle state of a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// No job of this kind has run yet.
    Idle,
    /// A job is in flight.
    Running,
    /// The most recent job finished successfully.
    Done,
    /// The most recent job failed.
    Failed,
}

impl JobState {
    /// Whether a new job of this kind may be admitted.
    #[must_use]
    pub fn is_terminal_or_idle(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Snapshot of one job record.
///
/// Invariant: at most one of `result`/`error` is set. Both are `None`
/// unless the state is terminal (`result` only for `Done`, `error` only
/// for `Failed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    /// Current lifecycle state.
    pub state: JobState,
    /// Job payload: artifact filename for synthesis, decoded text for
    /// transcription. Present only when `state` is [`JobState::Done`].
    pub result: Option<String>,
    /// Human-readable failure message. Present only when `state` is
    /// [`JobState::Failed`].
    pub error: Option<String>,
}

impl JobStatus {
    const fn idle() -> Self {
        Self {
            state: JobState::Idle,
            result: None,
            error: None,
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Error returned when admission is refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    /// A job of this kind is already running; the in-flight record is
    /// left untouched.
    #[error("A {0} job is already in progress")]
    AlreadyRunning(JobKind),
}

/// Holds the two job records and enforces single-flight admission.
///
/// Cheap to share behind an `Arc`; reads never block on job work.
#[derive(Debug, Default)]
pub struct JobTracker {
    synthesis: Mutex<JobStatus>,
    transcription: Mutex<JobStatus>,
}

impl JobTracker {
    /// Create a tracker with both records `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: JobKind) -> &Mutex<JobStatus> {
        match kind {
            JobKind::Synthesis => &self.synthesis,
            JobKind::Transcription => &self.transcription,
        }
    }

    fn lock(&self, kind: JobKind) -> std::sync::MutexGuard<'_, JobStatus> {
        self.slot(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a new job of `kind`.
    ///
    /// Atomically checks the record and, if it is not `Running`, resets it
    /// to `{Running, None, None}`. Fails with
    /// [`TrackerError::AlreadyRunning`] otherwise, leaving the in-flight
    /// record untouched.
    pub fn begin(&self, kind: JobKind) -> Result<(), TrackerError> {
        let mut record = self.lock(kind);
        if record.state == JobState::Running {
            return Err(TrackerError::AlreadyRunning(kind));
        }
        *record = JobStatus {
            state: JobState::Running,
            result: None,
            error: None,
        };
        tracing::debug!(kind = %kind, "Job admitted");
        Ok(())
    }

    /// Mark the in-flight job of `kind` as finished with `result`.
    ///
    /// Callable only by the runner that owns the in-flight run.
    pub fn complete(&self, kind: JobKind, result: String) {
        let mut record = self.lock(kind);
        *record = JobStatus {
            state: JobState::Done,
            result: Some(result),
            error: None,
        };
        tracing::debug!(kind = %kind, "Job completed");
    }

    /// Mark the in-flight job of `kind` as failed with `message`.
    pub fn fail(&self, kind: JobKind, message: String) {
        let mut record = self.lock(kind);
        *record = JobStatus {
            state: JobState::Failed,
            result: None,
            error: Some(message),
        };
        tracing::debug!(kind = %kind, "Job failed");
    }

    /// Snapshot the current record for `kind`. Never blocks on job work,
    /// never mutates.
    #[must_use]
    pub fn status(&self, kind: JobKind) -> JobStatus {
        self.lock(kind).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let tracker = JobTracker::new();
        for kind in [JobKind::Synthesis, JobKind::Transcription] {
            let status = tracker.status(kind);
            assert_eq!(status.state, JobState::Idle);
            assert_eq!(status.result, None);
            assert_eq!(status.error, None);
        }
    }

    #[test]
    fn begin_transitions_to_running() {
        let tracker = JobTracker::new();
        tracker.begin(JobKind::Synthesis).unwrap();
        let status = tracker.status(JobKind::Synthesis);
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.result, None);
        assert_eq!(status.error, None);
    }

    #[test]
    fn second_begin_rejected_and_record_untouched() {
        let tracker = JobTracker::new();
        tracker.begin(JobKind::Synthesis).unwrap();
        let before = tracker.status(JobKind::Synthesis);

        let err = tracker.begin(JobKind::Synthesis).unwrap_err();
        assert_eq!(err, TrackerError::AlreadyRunning(JobKind::Synthesis));
        assert_eq!(tracker.status(JobKind::Synthesis), before);
    }

    #[test]
    fn kinds_are_independent() {
        let tracker = JobTracker::new();
        tracker.begin(JobKind::Synthesis).unwrap();
        // Transcription admission is unaffected by running synthesis.
        tracker.begin(JobKind::Transcription).unwrap();
        assert_eq!(
            tracker.status(JobKind::Transcription).state,
            JobState::Running
        );
    }

    #[test]
    fn complete_sets_result_only() {
        let tracker = JobTracker::new();
        tracker.begin(JobKind::Synthesis).unwrap();
        tracker.complete(JobKind::Synthesis, "hello_20250101_120000.m4a".into());

        let status = tracker.status(JobKind::Synthesis);
        assert_eq!(status.state, JobState::Done);
        assert_eq!(status.result.as_deref(), Some("hello_20250101_120000.m4a"));
        assert_eq!(status.error, None);
    }

    #[test]
    fn fail_sets_error_only() {
        let tracker = JobTracker::new();
        tracker.begin(JobKind::Transcription).unwrap();
        tracker.fail(JobKind::Transcription, "model exploded".into());

        let status = tracker.status(JobKind::Transcription);
        assert_eq!(status.state, JobState::Failed);
        assert_eq!(status.result, None);
        assert_eq!(status.error.as_deref(), Some("model exploded"));
    }

    #[test]
    fn terminal_states_admit_a_new_job() {
        let tracker = JobTracker::new();

        tracker.begin(JobKind::Synthesis).unwrap();
        tracker.complete(JobKind::Synthesis, "a.m4a".into());
        tracker.begin(JobKind::Synthesis).unwrap();
        assert_eq!(tracker.status(JobKind::Synthesis).state, JobState::Running);

        tracker.fail(JobKind::Synthesis, "boom".into());
        tracker.begin(JobKind::Synthesis).unwrap();
        let status = tracker.status(JobKind::Synthesis);
        // The new run clears the previous failure.
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.error, None);
    }

    #[test]
    fn job_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobState::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(serde_json::to_string(&JobState::Idle).unwrap(), "\"idle\"");
    }
}
