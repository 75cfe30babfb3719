//! Engine-agnostic backend traits for STT and TTS.
//!
//! The [`SpeechService`](crate::service::SpeechService) operates on trait
//! objects (`Arc<dyn TtsBackend>`, `Arc<dyn SttBackend>`) so that concrete
//! engines can be swapped — or mocked in tests — without touching the job
//! execution logic.
//!
//! | Feature    | Module      | STT | TTS |
//! |------------|-------------|-----|-----|
//! | `kokoro`   | [`kokoro`]  |     |  ✓  |
//! | `whisper`  | [`whisper`] |  ✓  |     |

#[cfg(feature = "kokoro")]
pub mod kokoro;
#[cfg(feature = "whisper")]
pub mod whisper;

use std::time::Duration;

use crate::error::VoiceError;

/// Sample rate whisper.cpp expects (16 kHz mono).
pub const STT_SAMPLE_RATE: u32 = 16_000;

// ── Shared types ───────────────────────────────────────────────────

/// One ordered chunk of audio produced by TTS synthesis.
///
/// Segments are concatenated in production order by the assembler;
/// no reordering, no deduplication.
#[derive(Debug, Clone)]
pub struct TtsAudio {
    /// PCM f32 samples.
    pub samples: Vec<f32>,

    /// Sample rate of the audio (24 000 Hz for Kokoro).
    pub sample_rate: u32,

    /// Duration of the audio.
    pub duration: Duration,
}

impl TtsAudio {
    /// Build a segment, deriving the duration from the sample count.
    #[must_use]
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let duration = if sample_rate > 0 {
            Duration::from_secs_f64(samples.len() as f64 / f64::from(sample_rate))
        } else {
            Duration::ZERO
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }
}

/// Information about an available TTS voice.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice identifier (used in API calls).
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Language/accent category.
    pub category: String,

    /// Gender.
    pub gender: VoiceGender,
}

/// Voice gender.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

// ── TTS backend trait ──────────────────────────────────────────────

/// Backend-agnostic text-to-speech engine.
///
/// `synthesize` is async (via [`async_trait`]) because implementations
/// dispatch CPU-bound inference through `spawn_blocking`.
#[async_trait::async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize `text` with the given voice id, returning the produced
    /// audio segments in production order.
    ///
    /// An unknown voice id falls back to the engine default rather than
    /// erroring; the id is semantically opaque to callers.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<TtsAudio>, VoiceError>;

    /// Output sample rate (Hz).
    fn sample_rate(&self) -> u32;

    /// List all available voices with metadata.
    fn available_voices(&self) -> Vec<VoiceInfo>;
}

// ── STT backend trait ──────────────────────────────────────────────

/// Backend-agnostic speech-to-text engine.
///
/// `transcribe` is a blocking call; the service dispatches it through
/// `spawn_blocking`, so implementations must be `Send + Sync`.
pub trait SttBackend: Send + Sync {
    /// Transcribe PCM f32 samples at 16 kHz mono to text.
    ///
    /// Returns an empty string if no speech was detected.
    fn transcribe(&self, audio: &[f32]) -> Result<String, VoiceError>;
}

// ── Helpers ────────────────────────────────────────────────────────

/// Convenience constructor for [`VoiceInfo`].
#[cfg(feature = "kokoro")]
pub(crate) fn voice_info(id: &str, name: &str, category: &str, gender: VoiceGender) -> VoiceInfo {
    VoiceInfo {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        gender,
    }
}
