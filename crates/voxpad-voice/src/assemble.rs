//! Audio assembly: segments → WAV intermediate → encoded artifact.
//!
//! Concatenates the TTS segments in production order, writes them to a
//! temporary lossless WAV, and hands that to the external encoder. The
//! temp file is owned by a [`tempfile::NamedTempFile`], so it is deleted
//! when this function returns — on the success path and on every error
//! path alike. The final artifact is *not* cleaned up on failure; a
//! partially written output may remain, matching the documented contract.

use std::path::Path;

use crate::audio::write_wav;
use crate::backend::TtsAudio;
use crate::encode::AudioEncoder;
use crate::error::VoiceError;

/// Merge `segments` and encode them into the artifact at `output`.
///
/// Fails with [`VoiceError::EmptySynthesis`] when there are no samples to
/// assemble.
pub async fn assemble(
    segments: &[TtsAudio],
    encoder: &dyn AudioEncoder,
    output: &Path,
) -> Result<(), VoiceError> {
    let Some(first) = segments.first() else {
        return Err(VoiceError::EmptySynthesis);
    };
    let sample_rate = first.sample_rate;

    let total: usize = segments.iter().map(|s| s.samples.len()).sum();
    if total == 0 {
        return Err(VoiceError::EmptySynthesis);
    }

    let mut combined = Vec::with_capacity(total);
    for segment in segments {
        combined.extend_from_slice(&segment.samples);
    }

    tracing::debug!(
        segments = segments.len(),
        samples = combined.len(),
        sample_rate,
        "Assembling audio"
    );

    // Deleted on drop, whatever happens below.
    let tmp = tempfile::Builder::new()
        .prefix("voxpad-")
        .suffix(".wav")
        .tempfile()?;

    write_wav(tmp.path(), &combined, sample_rate)?;
    encoder.encode(tmp.path(), output).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Encoder stand-in that records the WAV path it was handed and
    /// either copies it to the output or fails.
    struct ProbeEncoder {
        seen_input: Mutex<Option<PathBuf>>,
        fail: bool,
    }

    impl ProbeEncoder {
        fn new(fail: bool) -> Self {
            Self {
                seen_input: Mutex::new(None),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl AudioEncoder for ProbeEncoder {
        async fn encode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
            *self.seen_input.lock().unwrap() = Some(input.to_path_buf());
            if self.fail {
                return Err(VoiceError::EncodingFailed {
                    status: "exit code 1".into(),
                    stderr: "simulated".into(),
                });
            }
            std::fs::copy(input, output)?;
            Ok(())
        }
    }

    fn segment(len: usize) -> TtsAudio {
        TtsAudio::from_samples(vec![0.25; len], 24_000)
    }

    #[tokio::test]
    async fn zero_segments_is_empty_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = ProbeEncoder::new(false);
        let err = assemble(&[], &encoder, &dir.path().join("out.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::EmptySynthesis));
    }

    #[tokio::test]
    async fn segments_with_no_samples_is_empty_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = ProbeEncoder::new(false);
        let err = assemble(&[segment(0)], &encoder, &dir.path().join("out.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::EmptySynthesis));
    }

    #[tokio::test]
    async fn temp_wav_is_deleted_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.m4a");
        let encoder = ProbeEncoder::new(false);

        assemble(&[segment(1000), segment(500)], &encoder, &out)
            .await
            .unwrap();

        assert!(out.exists());
        let tmp = encoder.seen_input.lock().unwrap().clone().unwrap();
        assert!(!tmp.exists(), "temp wav survived: {}", tmp.display());
    }

    #[tokio::test]
    async fn temp_wav_is_deleted_after_encoder_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.m4a");
        let encoder = ProbeEncoder::new(true);

        let err = assemble(&[segment(1000)], &encoder, &out).await.unwrap_err();
        assert!(matches!(err, VoiceError::EncodingFailed { .. }));

        let tmp = encoder.seen_input.lock().unwrap().clone().unwrap();
        assert!(!tmp.exists(), "temp wav survived: {}", tmp.display());
    }

    #[tokio::test]
    async fn encoder_receives_a_valid_wav_with_all_samples() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.m4a");

        struct InspectingEncoder;
        #[async_trait::async_trait]
        impl AudioEncoder for InspectingEncoder {
            async fn encode(&self, input: &Path, _output: &Path) -> Result<(), VoiceError> {
                let reader = hound::WavReader::open(input).unwrap();
                assert_eq!(reader.spec().sample_rate, 24_000);
                assert_eq!(reader.spec().channels, 1);
                assert_eq!(reader.len(), 1500);
                Ok(())
            }
        }

        assemble(&[segment(1000), segment(500)], &InspectingEncoder, &out)
            .await
            .unwrap();
    }
}
