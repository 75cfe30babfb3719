//! WAV decode/encode plumbing.
//!
//! Uploaded audio is decoded to the 16 kHz mono f32 layout whisper.cpp
//! consumes: multi-channel input is averaged down to mono and anything
//! not already at 16 kHz is resampled with rubato. The assembler uses
//! [`write_wav`] for the 16-bit PCM intermediate handed to the encoder.

use std::path::Path;

use rubato::{FftFixedIn, Resampler as _};

use crate::backend::STT_SAMPLE_RATE;
use crate::error::VoiceError;

/// Decode a WAV file to 16 kHz mono f32 samples.
pub fn decode_wav_file(path: &Path) -> Result<Vec<f32>, VoiceError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| VoiceError::UnsupportedAudio(format!("{e}")))?;
    let spec = reader.spec();

    let samples = read_samples(reader, spec)?;
    let mono = to_mono(&samples, spec.channels);

    if spec.sample_rate == STT_SAMPLE_RATE {
        return Ok(mono);
    }
    resample(&mono, spec.sample_rate, STT_SAMPLE_RATE)
}

fn read_samples<R: std::io::Read>(
    mut reader: hound::WavReader<R>,
    spec: hound::WavSpec,
) -> Result<Vec<f32>, VoiceError> {
    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            #[allow(clippy::cast_precision_loss)]
            let scale = f32::from(2u16).powi(i32::from(spec.bits_per_sample) - 1);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
    };
    samples.map_err(|e| VoiceError::UnsupportedAudio(format!("{e}")))
}

/// Write f32 samples to a 16-bit PCM mono WAV file.
///
/// Samples are clamped to [-1, 1] before quantization.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), VoiceError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| VoiceError::Io(hound_io(e)))?;
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| VoiceError::Io(hound_io(e)))?;
    }
    writer.finalize().map_err(|e| VoiceError::Io(hound_io(e)))
}

fn hound_io(e: hound::Error) -> std::io::Error {
    match e {
        hound::Error::IoError(io) => io,
        other => std::io::Error::other(other),
    }
}

/// Convert interleaved multi-channel audio to mono by averaging channels.
fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample audio from one sample rate to another using FFT-based resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, VoiceError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = 1024;

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        chunk_size,
        2, // sub-chunks for quality
        1, // mono
    )
    .map_err(|e| VoiceError::ResampleError(e.to_string()))?;

    let mut output = Vec::new();

    let mut pos = 0;
    while pos + chunk_size <= samples.len() {
        let chunk = &samples[pos..pos + chunk_size];
        let result = resampler
            .process(&[chunk], None)
            .map_err(|e| VoiceError::ResampleError(e.to_string()))?;
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
        pos += chunk_size;
    }

    // Handle remaining samples by padding with zeros.
    if pos < samples.len() {
        let remaining = &samples[pos..];
        let mut padded = vec![0.0f32; chunk_size];
        padded[..remaining.len()].copy_from_slice(remaining);

        let result = resampler
            .process(&[&padded], None)
            .map_err(|e| VoiceError::ResampleError(e.to_string()))?;
        if let Some(channel) = result.first() {
            // Only take the proportional amount of output.
            #[allow(clippy::cast_precision_loss)]
            #[allow(clippy::cast_possible_truncation)]
            #[allow(clippy::cast_sign_loss)]
            let output_len =
                (remaining.len() as f64 * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize;
            let take = output_len.min(channel.len());
            output.extend_from_slice(&channel[..take]);
        }
    }

    Ok(output)
}
