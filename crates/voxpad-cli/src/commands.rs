//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands for the voxpad speech server.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (API and web page)
    Serve(ServeArgs),

    /// Show resolved paths for data, history, and model files
    Paths,

    /// List the available voices
    Voices,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port to serve on
    #[arg(short, long, default_value = "5757")]
    pub port: u16,

    /// Data directory (artifacts, history, uploads)
    #[arg(long, env = "VOXPAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory containing the Kokoro model bundle
    #[arg(long, env = "VOXPAD_TTS_MODEL_DIR")]
    pub tts_model_dir: Option<PathBuf>,

    /// Path to the whisper GGML model file
    #[arg(long, env = "VOXPAD_STT_MODEL")]
    pub stt_model: Option<PathBuf>,

    /// Default voice for synthesis requests that do not name one
    #[arg(long, default_value = "af_heart")]
    pub voice: String,

    /// AAC bitrate for generated audio, in kbit/s
    #[arg(long, default_value = "64")]
    pub bitrate: u32,

    /// Explicit path to the ffmpeg binary (default: search PATH)
    #[arg(long)]
    pub encoder: Option<PathBuf>,

    /// Directory of static assets to serve as the web page
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Serve the API only, without a web page
    #[arg(long)]
    pub api_only: bool,

    /// Restrict CORS to these origins (default: allow all)
    #[arg(long, action = clap::ArgAction::Append)]
    pub allow_origin: Vec<String>,
}
