//! Speech engines and job execution for voxpad.
//!
//! Local STT (whisper.cpp via `whisper-rs`) and TTS (Kokoro via
//! sherpa-onnx) behind engine-agnostic traits, plus the
//! [`service::SpeechService`] that runs synthesis/transcription jobs in
//! detached background tasks.

pub mod assemble;
pub mod audio;
pub mod backend;
pub mod chunk;
pub mod encode;
pub mod error;
pub mod service;

pub use backend::{SttBackend, TtsAudio, TtsBackend, VoiceGender, VoiceInfo};
pub use encode::{AudioEncoder, DEFAULT_BITRATE_KBPS, FfmpegEncoder};
pub use error::VoiceError;
pub use service::{AdmissionError, SpeechService};

#[cfg(feature = "kokoro")]
pub use backend::kokoro::{KokoroConfig, KokoroTtsBackend, kokoro_voices};
#[cfg(feature = "whisper")]
pub use backend::whisper::{WhisperBackend, WhisperConfig};
