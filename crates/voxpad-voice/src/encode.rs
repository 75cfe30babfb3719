//! External audio encoder invocation.
//!
//! The final artifact is AAC in an MP4 container (`.m4a`), produced by
//! shelling out to ffmpeg. The encoder sits behind the [`AudioEncoder`]
//! trait so the job runner can be exercised in tests without a real
//! ffmpeg on PATH.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::VoiceError;

/// Default AAC bitrate (kbit/s).
pub const DEFAULT_BITRATE_KBPS: u32 = 64;

/// Compresses a WAV intermediate into the final artifact container.
#[async_trait::async_trait]
pub trait AudioEncoder: Send + Sync {
    /// Encode `input` (WAV) to `output` (`.m4a`), overwriting any
    /// existing file at `output`.
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// ffmpeg-based AAC encoder.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    bitrate_kbps: u32,
}

impl FfmpegEncoder {
    /// Locate `ffmpeg` on PATH.
    pub fn locate(bitrate_kbps: u32) -> Result<Self, VoiceError> {
        let binary = which::which("ffmpeg")
            .map_err(|e| VoiceError::EncoderNotFound(format!("ffmpeg: {e}")))?;
        tracing::debug!(binary = %binary.display(), "Located audio encoder");
        Ok(Self {
            binary,
            bitrate_kbps,
        })
    }

    /// Use an explicit encoder binary instead of searching PATH.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>, bitrate_kbps: u32) -> Self {
        Self {
            binary: binary.into(),
            bitrate_kbps,
        }
    }
}

#[async_trait::async_trait]
impl AudioEncoder for FfmpegEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            bitrate_kbps = self.bitrate_kbps,
            "Encoding artifact"
        );

        let result = tokio::process::Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c:a", "aac", "-b:a", &format!("{}k", self.bitrate_kbps)])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        // ffmpeg is chatty; keep only the tail, which carries the actual error.
        let tail: String = stderr
            .lines()
            .rev()
            .take(3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join(" | ");

        Err(VoiceError::EncodingFailed {
            status: result
                .status
                .code()
                .map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}")),
            stderr: tail,
        })
    }
}
