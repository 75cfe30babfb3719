//! Speech engine and job execution error types.

use std::path::PathBuf;

/// Errors that can occur while running a synthesis or transcription job.
///
/// Every external-library failure path is mapped to one of these variants
/// at the engine boundary, so failure reporting stays a typed result
/// rather than a generic exception string.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// Model file or directory not found at the expected path.
    #[error("Voice model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Failed to load a speech model.
    #[error("Failed to load voice model: {0}")]
    ModelLoadError(String),

    /// The TTS engine raised an error.
    #[error("Speech synthesis failed: {0}")]
    SynthesisError(String),

    /// The TTS engine produced zero audio segments.
    #[error("Synthesis produced no audio output")]
    EmptySynthesis,

    /// The STT engine raised an error.
    #[error("Transcription failed: {0}")]
    TranscriptionError(String),

    /// The uploaded audio could not be decoded.
    #[error("Unsupported audio input: {0}")]
    UnsupportedAudio(String),

    /// Audio resampling error.
    #[error("Audio resampling failed: {0}")]
    ResampleError(String),

    /// No encoder binary found on PATH.
    #[error("Audio encoder not found: {0}")]
    EncoderNotFound(String),

    /// The external encoder process exited non-zero.
    #[error("Audio encoding failed ({status}): {stderr}")]
    EncodingFailed {
        /// Exit status description (code or signal).
        status: String,
        /// Trailing stderr output from the encoder.
        stderr: String,
    },

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
