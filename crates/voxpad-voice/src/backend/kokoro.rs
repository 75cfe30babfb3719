//! Kokoro TTS backend — implements [`TtsBackend`] via `sherpa-rs`.
//!
//! Wraps `sherpa_rs::tts::KokoroTts` behind the engine-agnostic
//! [`TtsBackend`] trait. The sherpa-rs `create` method requires `&mut
//! self`, while the trait uses `&self`, so the inner engine lives in an
//! `Arc<Mutex<…>>`. Inference is dispatched via
//! `tokio::task::spawn_blocking` so a Tokio worker thread is never
//! stalled during synthesis.
//!
//! Long input is split into sentence-sized chunks (see [`crate::chunk`])
//! and synthesized chunk by chunk; each chunk yields one ordered
//! [`TtsAudio`] segment.

use std::path::Path;
use std::sync::{Arc, Mutex};

use sherpa_rs::tts::{KokoroTts, KokoroTtsConfig};

use crate::backend::{TtsAudio, TtsBackend, VoiceGender, VoiceInfo, voice_info};
use crate::chunk::split_into_chunks;
use crate::error::VoiceError;

/// Kokoro output sample rate (24 kHz).
pub const KOKORO_SAMPLE_RATE: u32 = 24_000;

/// Configuration for the Kokoro TTS backend.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KokoroConfig {
    /// Playback speed multiplier (0.5–2.0, default 1.0).
    pub speed: f32,
}

impl Default for KokoroConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

/// Kokoro TTS backend.
///
/// The inner engine is behind a [`Mutex`] because `KokoroTts::create`
/// takes `&mut self` while [`TtsBackend`] requires `&self`. `KokoroTts`
/// is `Send + Sync` per sherpa-rs's own impls.
pub struct KokoroTtsBackend {
    engine: Arc<Mutex<KokoroTts>>,
    speed: f32,
}

impl KokoroTtsBackend {
    /// Load the Kokoro TTS model from a directory.
    ///
    /// The directory must contain `model.onnx`, `voices.bin`,
    /// `tokens.txt`, and the `espeak-ng-data/` lexicon directory — the
    /// layout of the sherpa-onnx `kokoro-multi-lang-v1_0` bundle.
    pub fn load(model_dir: &Path, config: &KokoroConfig) -> Result<Self, VoiceError> {
        if !model_dir.exists() {
            return Err(VoiceError::ModelNotFound(model_dir.to_path_buf()));
        }

        let model_path = model_dir.join("model.onnx");
        let voices_path = model_dir.join("voices.bin");
        let tokens_path = model_dir.join("tokens.txt");
        let data_dir = model_dir.join("espeak-ng-data");

        for path in [&model_path, &voices_path, &tokens_path] {
            if !path.exists() {
                return Err(VoiceError::ModelNotFound(path.clone()));
            }
        }

        tracing::info!(
            dir = %model_dir.display(),
            speed = config.speed,
            "Loading Kokoro TTS model"
        );

        let sherpa_config = KokoroTtsConfig {
            model: path_to_string(&model_path)?,
            voices: path_to_string(&voices_path)?,
            tokens: path_to_string(&tokens_path)?,
            data_dir: path_to_string(&data_dir)?,
            length_scale: config.speed,
            ..Default::default()
        };

        let engine = KokoroTts::new(sherpa_config);

        tracing::info!("Kokoro TTS model loaded");

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            speed: config.speed,
        })
    }

    async fn synthesize_chunk(&self, text: String, sid: i32) -> Result<TtsAudio, VoiceError> {
        // Kokoro inference is CPU-bound and can take seconds for long
        // sentences. Offload to the blocking thread pool.
        let engine = Arc::clone(&self.engine);
        let speed = self.speed;

        let audio = tokio::task::spawn_blocking(move || {
            engine
                .lock()
                .map_err(|e| VoiceError::SynthesisError(format!("TTS engine lock poisoned: {e}")))
                .and_then(|mut guard| {
                    guard
                        .create(&text, sid, speed)
                        .map_err(|e| VoiceError::SynthesisError(format!("{e}")))
                })
        })
        .await
        .map_err(|e| VoiceError::SynthesisError(format!("spawn_blocking join error: {e}")))??;

        Ok(TtsAudio::from_samples(audio.samples, audio.sample_rate))
    }
}

#[async_trait::async_trait]
impl TtsBackend for KokoroTtsBackend {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<TtsAudio>, VoiceError> {
        let sid = voice_id_to_speaker_id(voice);

        let chunks = split_into_chunks(text);
        tracing::debug!(
            text_len = text.len(),
            chunks = chunks.len(),
            voice = %voice,
            speaker_id = sid,
            "Synthesizing speech (Kokoro)"
        );

        let mut segments = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let segment = self.synthesize_chunk(chunk, sid).await?;
            if !segment.samples.is_empty() {
                segments.push(segment);
            }
        }

        tracing::debug!(segments = segments.len(), "Speech synthesized (Kokoro)");
        Ok(segments)
    }

    fn sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    fn available_voices(&self) -> Vec<VoiceInfo> {
        kokoro_voices()
    }
}

fn path_to_string(path: &Path) -> Result<String, VoiceError> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| VoiceError::ModelLoadError(format!("Invalid UTF-8 path: {}", path.display())))
}

// ── Voice catalogue ────────────────────────────────────────────────
//
// English voices of the Kokoro v1.0 multi-lang model. Speaker IDs are the
// indices into the packed `voices.bin` style matrix, as declared in the
// ONNX model's `speaker2id` metadata (voices sorted alphabetically).

/// Map a voice ID string (e.g., `"af_heart"`) to the sherpa-onnx speaker ID.
///
/// Unknown voices fall back to the default speaker with a warning — the
/// voice id is an opaque client-supplied string, not validated input.
fn voice_id_to_speaker_id(voice_id: &str) -> i32 {
    match voice_id {
        "af_alloy" => 0,
        "af_aoede" => 1,
        "af_bella" => 2,
        "af_heart" => 3,
        "af_jessica" => 4,
        "af_kore" => 5,
        "af_nicole" => 6,
        "af_nova" => 7,
        "af_river" => 8,
        "af_sarah" => 9,
        "af_sky" => 10,
        "am_adam" => 11,
        "am_echo" => 12,
        "am_eric" => 13,
        "am_fenrir" => 14,
        "am_liam" => 15,
        "am_michael" => 16,
        "am_onyx" => 17,
        "am_puck" => 18,
        "am_santa" => 19,
        "bf_alice" => 20,
        "bf_emma" => 21,
        "bf_isabella" => 22,
        "bf_lily" => 23,
        "bm_daniel" => 24,
        "bm_fable" => 25,
        "bm_george" => 26,
        "bm_lewis" => 27,
        _ => {
            tracing::warn!(voice = %voice_id, "Unknown Kokoro voice — using af_heart");
            3
        }
    }
}

/// List the English Kokoro v1.0 voices with metadata.
///
/// Free function so the catalogue can be served without a loaded engine.
#[must_use]
pub fn kokoro_voices() -> Vec<VoiceInfo> {
    vec![
        voice_info("af_heart", "Heart", "American English", VoiceGender::Female),
        voice_info("af_alloy", "Alloy", "American English", VoiceGender::Female),
        voice_info("af_aoede", "Aoede", "American English", VoiceGender::Female),
        voice_info("af_bella", "Bella", "American English", VoiceGender::Female),
        voice_info("af_jessica", "Jessica", "American English", VoiceGender::Female),
        voice_info("af_kore", "Kore", "American English", VoiceGender::Female),
        voice_info("af_nicole", "Nicole", "American English", VoiceGender::Female),
        voice_info("af_nova", "Nova", "American English", VoiceGender::Female),
        voice_info("af_river", "River", "American English", VoiceGender::Female),
        voice_info("af_sarah", "Sarah", "American English", VoiceGender::Female),
        voice_info("af_sky", "Sky", "American English", VoiceGender::Female),
        voice_info("am_adam", "Adam", "American English", VoiceGender::Male),
        voice_info("am_echo", "Echo", "American English", VoiceGender::Male),
        voice_info("am_eric", "Eric", "American English", VoiceGender::Male),
        voice_info("am_fenrir", "Fenrir", "American English", VoiceGender::Male),
        voice_info("am_liam", "Liam", "American English", VoiceGender::Male),
        voice_info("am_michael", "Michael", "American English", VoiceGender::Male),
        voice_info("am_onyx", "Onyx", "American English", VoiceGender::Male),
        voice_info("am_puck", "Puck", "American English", VoiceGender::Male),
        voice_info("am_santa", "Santa", "American English", VoiceGender::Male),
        voice_info("bf_alice", "Alice", "British English", VoiceGender::Female),
        voice_info("bf_emma", "Emma", "British English", VoiceGender::Female),
        voice_info("bf_isabella", "Isabella", "British English", VoiceGender::Female),
        voice_info("bf_lily", "Lily", "British English", VoiceGender::Female),
        voice_info("bm_daniel", "Daniel", "British English", VoiceGender::Male),
        voice_info("bm_fable", "Fable", "British English", VoiceGender::Male),
        voice_info("bm_george", "George", "British English", VoiceGender::Male),
        voice_info("bm_lewis", "Lewis", "British English", VoiceGender::Male),
    ]
}
