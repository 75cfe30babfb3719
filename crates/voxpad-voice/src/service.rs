//! `SpeechService` — the background job runner.
//!
//! One service instance owns the job tracker, the history store, and the
//! engine/encoder trait objects. `start_*` methods perform admission
//! synchronously (so the HTTP layer can reject conflicts immediately) and
//! then spawn a detached tokio task that runs the job to completion. The
//! spawning call returns before the task finishes; the shared status
//! record is the only channel back — no callback, no join handle kept.
//!
//! The runner catches every failure locally and always leaves the tracker
//! in a terminal state, never `Running` forever. No cancellation and no
//! timeout exist by design: a started job runs until it finishes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use voxpad_core::{
    HistoryEntry, HistoryStore, JobKind, JobStatus, JobTracker, TrackerError, artifact_filename,
};

use crate::assemble::assemble;
use crate::audio::decode_wav_file;
use crate::backend::{SttBackend, TtsBackend, VoiceInfo};
use crate::encode::AudioEncoder;
use crate::error::VoiceError;

/// Error returned synchronously when a job cannot be admitted.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The input was empty after trimming; no job was started and the
    /// tracker was not touched.
    #[error("Empty input")]
    EmptyInput,

    /// A job of this kind is already running.
    #[error(transparent)]
    Busy(#[from] TrackerError),
}

/// Owns job execution for both job kinds.
pub struct SpeechService {
    tracker: JobTracker,
    history: HistoryStore,
    tts: Arc<dyn TtsBackend>,
    stt: Arc<dyn SttBackend>,
    encoder: Arc<dyn AudioEncoder>,
    audio_dir: PathBuf,
    default_voice: String,
}

impl SpeechService {
    /// Assemble a service from its collaborators.
    ///
    /// `audio_dir` must already exist; artifacts are written directly
    /// into it.
    #[must_use]
    pub fn new(
        tts: Arc<dyn TtsBackend>,
        stt: Arc<dyn SttBackend>,
        encoder: Arc<dyn AudioEncoder>,
        history: HistoryStore,
        audio_dir: PathBuf,
        default_voice: String,
    ) -> Self {
        Self {
            tracker: JobTracker::new(),
            history,
            tts,
            stt,
            encoder,
            audio_dir,
            default_voice,
        }
    }

    /// Directory holding the generated artifacts.
    #[must_use]
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Snapshot of the synthesis record.
    #[must_use]
    pub fn synthesis_status(&self) -> JobStatus {
        self.tracker.status(JobKind::Synthesis)
    }

    /// Snapshot of the transcription record.
    #[must_use]
    pub fn transcription_status(&self) -> JobStatus {
        self.tracker.status(JobKind::Transcription)
    }

    /// Completed synthesis jobs, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.all()
    }

    /// Voice catalogue of the active TTS engine.
    #[must_use]
    pub fn voices(&self) -> Vec<VoiceInfo> {
        self.tts.available_voices()
    }

    // ── Synthesis ──────────────────────────────────────────────────

    /// Admit and start a synthesis job in the background.
    ///
    /// Returns as soon as the job is admitted; completion is observed by
    /// polling [`synthesis_status`](Self::synthesis_status).
    pub fn start_synthesis(
        self: &Arc<Self>,
        text: &str,
        voice: Option<String>,
    ) -> Result<(), AdmissionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdmissionError::EmptyInput);
        }
        self.tracker.begin(JobKind::Synthesis)?;

        let service = Arc::clone(self);
        let text = text.to_string();
        let voice = voice.unwrap_or_else(|| self.default_voice.clone());

        tracing::info!(chars = text.len(), voice = %voice, "Synthesis job started");
        tokio::spawn(async move {
            match service.synthesize_job(&text, &voice).await {
                Ok(filename) => {
                    tracing::info!(filename = %filename, "Synthesis job done");
                    service.tracker.complete(JobKind::Synthesis, filename);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Synthesis job failed");
                    service.tracker.fail(JobKind::Synthesis, e.to_string());
                }
            }
        });
        Ok(())
    }

    async fn synthesize_job(&self, text: &str, voice: &str) -> Result<String, VoiceError> {
        // Same leading words within the same second produce the same name
        // and the later job overwrites the earlier artifact. Accepted.
        let filename = artifact_filename(text, Local::now());
        let output = self.audio_dir.join(&filename);

        let segments = self.tts.synthesize(text, voice).await?;
        assemble(&segments, self.encoder.as_ref(), &output).await?;

        // Persist before flipping the status so a client that sees `done`
        // always finds the entry in the history.
        let entry = HistoryEntry::new(filename.clone(), text, voice.to_string(), Local::now());
        self.history.prepend(entry)?;

        Ok(filename)
    }

    // ── Transcription ──────────────────────────────────────────────

    /// Admit and start a transcription job for an uploaded scratch file.
    ///
    /// The caller hands over ownership of `scratch`: whatever the outcome,
    /// the runner deletes it once the job finishes. On an admission error
    /// the file is untouched and remains the caller's to clean up.
    pub fn start_transcription(self: &Arc<Self>, scratch: PathBuf) -> Result<(), AdmissionError> {
        self.tracker.begin(JobKind::Transcription)?;

        let service = Arc::clone(self);
        tracing::info!(file = %scratch.display(), "Transcription job started");
        tokio::spawn(async move {
            let result = service.transcribe_job(&scratch).await;

            // Guaranteed cleanup of the scratch upload, success or not.
            if let Err(e) = tokio::fs::remove_file(&scratch).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(file = %scratch.display(), error = %e, "Failed to delete scratch file");
                }
            }

            match result {
                Ok(text) => {
                    tracing::info!(chars = text.len(), "Transcription job done");
                    service.tracker.complete(JobKind::Transcription, text);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Transcription job failed");
                    service.tracker.fail(JobKind::Transcription, e.to_string());
                }
            }
        });
        Ok(())
    }

    async fn transcribe_job(&self, scratch: &Path) -> Result<String, VoiceError> {
        let path = scratch.to_path_buf();
        let samples = tokio::task::spawn_blocking(move || decode_wav_file(&path))
            .await
            .map_err(|e| VoiceError::TranscriptionError(format!("spawn_blocking join error: {e}")))??;

        // Whisper inference is CPU-bound for seconds; keep it off the
        // async workers.
        let stt = Arc::clone(&self.stt);
        let text = tokio::task::spawn_blocking(move || stt.transcribe(&samples))
            .await
            .map_err(|e| VoiceError::TranscriptionError(format!("spawn_blocking join error: {e}")))??;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TtsAudio;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use voxpad_core::JobState;

    // ── Test doubles ───────────────────────────────────────────────

    /// TTS double: optionally gated on a Notify, returns a fixed number
    /// of segments.
    struct FakeTts {
        segments: usize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait::async_trait]
    impl TtsBackend for FakeTts {
        async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<TtsAudio>, VoiceError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok((0..self.segments)
                .map(|_| TtsAudio::from_samples(vec![0.1; 256], 24_000))
                .collect())
        }

        fn sample_rate(&self) -> u32 {
            24_000
        }

        fn available_voices(&self) -> Vec<VoiceInfo> {
            Vec::new()
        }
    }

    struct FakeStt {
        reply: Result<String, String>,
    }

    impl SttBackend for FakeStt {
        fn transcribe(&self, _audio: &[f32]) -> Result<String, VoiceError> {
            self.reply
                .clone()
                .map_err(VoiceError::TranscriptionError)
        }
    }

    struct FakeEncoder {
        fail: bool,
        outputs: Mutex<Vec<PathBuf>>,
    }

    #[async_trait::async_trait]
    impl AudioEncoder for FakeEncoder {
        async fn encode(&self, _input: &Path, output: &Path) -> Result<(), VoiceError> {
            if self.fail {
                return Err(VoiceError::EncodingFailed {
                    status: "exit code 1".into(),
                    stderr: "simulated encoder failure".into(),
                });
            }
            std::fs::write(output, b"m4a")?;
            self.outputs.lock().unwrap().push(output.to_path_buf());
            Ok(())
        }
    }

    struct Fixture {
        service: Arc<SpeechService>,
        _dir: tempfile::TempDir,
    }

    fn fixture(tts: FakeTts, stt: FakeStt, encoder_fails: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audio");
        std::fs::create_dir_all(&audio_dir).unwrap();
        let history = HistoryStore::load(dir.path().join("history.json")).unwrap();

        let service = Arc::new(SpeechService::new(
            Arc::new(tts),
            Arc::new(stt),
            Arc::new(FakeEncoder {
                fail: encoder_fails,
                outputs: Mutex::new(Vec::new()),
            }),
            history,
            audio_dir,
            "af_heart".to_string(),
        ));
        Fixture { service, _dir: dir }
    }

    fn ok_stt() -> FakeStt {
        FakeStt {
            reply: Ok("  hello world  ".to_string()),
        }
    }

    async fn wait_terminal(service: &SpeechService, kind: JobKind) -> JobStatus {
        for _ in 0..500 {
            let status = service.tracker.status(kind);
            if matches!(status.state, JobState::Done | JobState::Failed) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job never reached a terminal state");
    }

    fn scratch_wav(dir: &Path) -> PathBuf {
        let path = dir.join("upload.wav");
        crate::audio::write_wav(&path, &vec![0.1; 16_000], 16_000).unwrap();
        path
    }

    // ── Synthesis ──────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_state_change() {
        let f = fixture(FakeTts { segments: 1, gate: None }, ok_stt(), false);

        for input in ["", "   ", "\n\t"] {
            let err = f.service.start_synthesis(input, None).unwrap_err();
            assert!(matches!(err, AdmissionError::EmptyInput));
        }
        assert_eq!(f.service.synthesis_status().state, JobState::Idle);
    }

    #[tokio::test]
    async fn successful_synthesis_produces_artifact_and_history() {
        let f = fixture(FakeTts { segments: 3, gate: None }, ok_stt(), false);

        f.service
            .start_synthesis("Hello, World! This is a test.", None)
            .unwrap();
        let status = wait_terminal(&f.service, JobKind::Synthesis).await;

        assert_eq!(status.state, JobState::Done);
        let filename = status.result.unwrap();
        assert!(filename.starts_with("hello_world_this_is_a_"));
        assert!(filename.ends_with(".m4a"));
        assert!(f.service.audio_dir().join(&filename).exists());
        assert_eq!(status.error, None);

        let history = f.service.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].filename, filename);
        assert_eq!(history[0].voice, "af_heart");
    }

    #[tokio::test]
    async fn concurrent_synthesis_is_rejected_and_in_flight_job_unaffected() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            FakeTts {
                segments: 1,
                gate: Some(Arc::clone(&gate)),
            },
            ok_stt(),
            false,
        );

        f.service.start_synthesis("first job text", None).unwrap();
        assert_eq!(f.service.synthesis_status().state, JobState::Running);

        let err = f.service.start_synthesis("second job text", None).unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::Busy(TrackerError::AlreadyRunning(JobKind::Synthesis))
        ));
        assert_eq!(f.service.synthesis_status().state, JobState::Running);

        gate.notify_one();
        let status = wait_terminal(&f.service, JobKind::Synthesis).await;
        assert_eq!(status.state, JobState::Done);
        // Only the first job ran.
        assert_eq!(f.service.history().len(), 1);
        assert!(f.service.history()[0].filename.starts_with("first_job_text_"));
    }

    #[tokio::test]
    async fn zero_segments_fails_the_job() {
        let f = fixture(FakeTts { segments: 0, gate: None }, ok_stt(), false);

        f.service.start_synthesis("some text", None).unwrap();
        let status = wait_terminal(&f.service, JobKind::Synthesis).await;

        assert_eq!(status.state, JobState::Failed);
        assert_eq!(status.result, None);
        assert!(status.error.unwrap().contains("no audio output"));
        assert!(f.service.history().is_empty());
    }

    #[tokio::test]
    async fn encoder_failure_fails_the_job_without_history() {
        let f = fixture(FakeTts { segments: 2, gate: None }, ok_stt(), true);

        f.service.start_synthesis("some text", None).unwrap();
        let status = wait_terminal(&f.service, JobKind::Synthesis).await;

        assert_eq!(status.state, JobState::Failed);
        assert!(status.error.unwrap().contains("encoding failed"));
        assert!(f.service.history().is_empty());
        // A new job may start once the record is terminal.
        f.service.start_synthesis("retry", None).unwrap();
    }

    #[tokio::test]
    async fn explicit_voice_overrides_the_default() {
        let f = fixture(FakeTts { segments: 1, gate: None }, ok_stt(), false);

        f.service
            .start_synthesis("voice pick", Some("bm_george".to_string()))
            .unwrap();
        wait_terminal(&f.service, JobKind::Synthesis).await;

        assert_eq!(f.service.history()[0].voice, "bm_george");
    }

    // ── Transcription ──────────────────────────────────────────────

    #[tokio::test]
    async fn successful_transcription_trims_and_cleans_up() {
        let f = fixture(FakeTts { segments: 1, gate: None }, ok_stt(), false);
        let scratch = scratch_wav(f.service.audio_dir());

        f.service.start_transcription(scratch.clone()).unwrap();
        let status = wait_terminal(&f.service, JobKind::Transcription).await;

        assert_eq!(status.state, JobState::Done);
        assert_eq!(status.result.as_deref(), Some("hello world"));
        assert!(!scratch.exists(), "scratch upload survived");
    }

    #[tokio::test]
    async fn failed_transcription_still_cleans_up() {
        let f = fixture(
            FakeTts { segments: 1, gate: None },
            FakeStt {
                reply: Err("model exploded".to_string()),
            },
            false,
        );
        let scratch = scratch_wav(f.service.audio_dir());

        f.service.start_transcription(scratch.clone()).unwrap();
        let status = wait_terminal(&f.service, JobKind::Transcription).await;

        assert_eq!(status.state, JobState::Failed);
        assert!(status.error.unwrap().contains("model exploded"));
        assert!(!scratch.exists(), "scratch upload survived");
    }

    #[tokio::test]
    async fn undecodable_upload_fails_and_cleans_up() {
        let f = fixture(FakeTts { segments: 1, gate: None }, ok_stt(), false);
        let scratch = f.service.audio_dir().join("junk.wav");
        std::fs::write(&scratch, b"not audio").unwrap();

        f.service.start_transcription(scratch.clone()).unwrap();
        let status = wait_terminal(&f.service, JobKind::Transcription).await;

        assert_eq!(status.state, JobState::Failed);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn jobs_of_different_kinds_run_concurrently() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            FakeTts {
                segments: 1,
                gate: Some(Arc::clone(&gate)),
            },
            ok_stt(),
            false,
        );

        f.service.start_synthesis("long running", None).unwrap();
        let scratch = scratch_wav(f.service.audio_dir());
        // Transcription is admitted while synthesis is still running.
        f.service.start_transcription(scratch).unwrap();

        let status = wait_terminal(&f.service, JobKind::Transcription).await;
        assert_eq!(status.state, JobState::Done);
        assert_eq!(f.service.synthesis_status().state, JobState::Running);

        gate.notify_one();
        wait_terminal(&f.service, JobKind::Synthesis).await;
    }

    #[tokio::test]
    async fn history_accumulates_newest_first_across_jobs() {
        let f = fixture(FakeTts { segments: 1, gate: None }, ok_stt(), false);

        for text in ["first one", "second one", "third one"] {
            f.service.start_synthesis(text, None).unwrap();
            wait_terminal(&f.service, JobKind::Synthesis).await;
        }

        let history = f.service.history();
        assert_eq!(history.len(), 3);
        assert!(history[0].filename.starts_with("third_one_"));
        assert!(history[2].filename.starts_with("first_one_"));
    }
}
