//! Server bootstrap — the composition root.
//!
//! This module is the only place where concrete engines, the encoder,
//! and the history store are wired together. Handlers and tests work
//! against [`AppContext`] and never construct engines themselves.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use voxpad_voice::SpeechService;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Data directory: artifacts land in `audio/`, uploads in `uploads/`,
    /// the history file at `history.json`.
    pub data_dir: PathBuf,
    /// Directory containing the Kokoro TTS model bundle.
    pub tts_model_dir: PathBuf,
    /// Path to the whisper GGML model file.
    pub stt_model_path: PathBuf,
    /// Voice used when a request does not name one.
    pub default_voice: String,
    /// Explicit encoder binary; `None` searches PATH for ffmpeg.
    pub encoder_path: Option<PathBuf>,
    /// AAC bitrate for artifacts, in kbit/s.
    pub bitrate_kbps: u32,
    /// Optional path to static assets for the web page.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Create a config with defaults for everything but the required paths.
    #[must_use]
    pub fn new(
        data_dir: impl Into<PathBuf>,
        tts_model_dir: impl Into<PathBuf>,
        stt_model_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            port: 5757,
            data_dir: data_dir.into(),
            tts_model_dir: tts_model_dir.into(),
            stt_model_path: stt_model_path.into(),
            default_voice: "af_heart".to_string(),
            encoder_path: None,
            bitrate_kbps: voxpad_voice::DEFAULT_BITRATE_KBPS,
            static_dir: None,
            cors: CorsConfig::default(),
        }
    }

    /// Set the static directory for serving the web page.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context holding all initialized services.
pub struct AppContext {
    /// The speech service (job runner, tracker, history).
    pub service: Arc<SpeechService>,
    /// Scratch directory for uploaded audio awaiting transcription.
    pub upload_dir: PathBuf,
}

impl AppContext {
    /// Assemble a context from an already-built service.
    ///
    /// Used by `bootstrap` and by tests that inject mock engines.
    #[must_use]
    pub fn new(service: Arc<SpeechService>, upload_dir: PathBuf) -> Self {
        Self {
            service,
            upload_dir,
        }
    }
}

/// Bootstrap the server: load models, locate the encoder, open history.
#[cfg(feature = "engines")]
pub async fn bootstrap(config: &ServerConfig) -> Result<AppContext> {
    use voxpad_core::HistoryStore;
    use voxpad_voice::{
        AudioEncoder, FfmpegEncoder, KokoroConfig, KokoroTtsBackend, SttBackend, TtsBackend,
        WhisperBackend, WhisperConfig,
    };

    let audio_dir = config.data_dir.join("audio");
    let upload_dir = config.data_dir.join("uploads");
    let history_path = config.data_dir.join("history.json");

    tokio::fs::create_dir_all(&audio_dir).await?;
    tokio::fs::create_dir_all(&upload_dir).await?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        audio_dir = %audio_dir.display(),
        history = %history_path.display(),
        tts_model = %config.tts_model_dir.display(),
        stt_model = %config.stt_model_path.display(),
        "Bootstrap resolved paths"
    );

    let history = HistoryStore::load(&history_path)?;

    let encoder: Arc<dyn AudioEncoder> = Arc::new(match &config.encoder_path {
        Some(path) => FfmpegEncoder::with_binary(path, config.bitrate_kbps),
        None => FfmpegEncoder::locate(config.bitrate_kbps)?,
    });

    // Model loading reads hundreds of megabytes; keep it off the runtime
    // worker threads.
    let tts_dir = config.tts_model_dir.clone();
    let tts: Arc<dyn TtsBackend> = Arc::new(
        tokio::task::spawn_blocking(move || {
            KokoroTtsBackend::load(&tts_dir, &KokoroConfig::default())
        })
        .await??,
    );

    let stt_path = config.stt_model_path.clone();
    let stt: Arc<dyn SttBackend> = Arc::new(
        tokio::task::spawn_blocking(move || {
            WhisperBackend::load(&stt_path, &WhisperConfig::default())
        })
        .await??,
    );

    let service = Arc::new(SpeechService::new(
        tts,
        stt,
        encoder,
        history,
        audio_dir,
        config.default_voice.clone(),
    ));

    Ok(AppContext::new(service, upload_dir))
}

/// Start the web server on the configured port.
#[cfg(feature = "engines")]
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config).await?;

    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("voxpad listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
