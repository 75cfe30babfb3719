//! Path resolution for data and model directories.
//!
//! Everything lives under one data root so a single `voxpad paths`
//! invocation shows where artifacts, history, and models end up.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Could not determine the platform data directory")]
    NoDataDir,

    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Root directory for application data (artifacts, history, models).
///
/// Resolution order:
/// 1. `VOXPAD_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/voxpad`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("VOXPAD_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("voxpad");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Directory containing the Kokoro model bundle
/// (`model.onnx`, `voices.bin`, `tokens.txt`, `espeak-ng-data/`).
///
/// `VOXPAD_TTS_MODEL_DIR` overrides the default under the data root.
pub fn tts_model_dir() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("VOXPAD_TTS_MODEL_DIR") {
        return Ok(PathBuf::from(path));
    }
    Ok(data_root()?.join("models").join("kokoro"))
}

/// Path to the whisper GGML model file.
///
/// `VOXPAD_STT_MODEL` overrides the default under the data root.
pub fn stt_model_path() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("VOXPAD_STT_MODEL") {
        return Ok(PathBuf::from(path));
    }
    Ok(data_root()?
        .join("models")
        .join("whisper")
        .join("ggml-base.en.bin"))
}

/// All resolved paths, used by the `paths` diagnostic command.
#[derive(Debug)]
pub struct ResolvedPaths {
    pub data_root: PathBuf,
    pub audio_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub history_file: PathBuf,
    pub tts_model_dir: PathBuf,
    pub stt_model_path: PathBuf,
}

impl ResolvedPaths {
    pub fn resolve() -> Result<Self, PathError> {
        let root = data_root()?;
        Ok(Self {
            audio_dir: root.join("audio"),
            upload_dir: root.join("uploads"),
            history_file: root.join("history.json"),
            tts_model_dir: tts_model_dir()?,
            stt_model_path: stt_model_path()?,
            data_root: root,
        })
    }
}

impl fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "data_root      = {}", self.data_root.display())?;
        writeln!(f, "audio_dir      = {}", self.audio_dir.display())?;
        writeln!(f, "upload_dir     = {}", self.upload_dir.display())?;
        writeln!(f, "history_file   = {}", self.history_file.display())?;
        writeln!(f, "tts_model_dir  = {}", self.tts_model_dir.display())?;
        write!(f, "stt_model_path = {}", self.stt_model_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[allow(unsafe_code)] // std::env mutation is unsafe in edition 2024
    fn set_env(key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    #[allow(unsafe_code)]
    fn clear_env(key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }

    #[test]
    fn data_root_honors_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("VOXPAD_DATA_DIR", "/tmp/voxpad-test-root");
        let root = data_root().unwrap();
        clear_env("VOXPAD_DATA_DIR");
        assert_eq!(root, PathBuf::from("/tmp/voxpad-test-root"));
    }

    #[test]
    fn resolved_paths_hang_off_the_root() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("VOXPAD_DATA_DIR", "/tmp/voxpad-test-resolved");
        let paths = ResolvedPaths::resolve().unwrap();
        clear_env("VOXPAD_DATA_DIR");
        assert_eq!(paths.audio_dir, paths.data_root.join("audio"));
        assert_eq!(paths.history_file, paths.data_root.join("history.json"));
        assert!(paths.stt_model_path.starts_with(&paths.data_root));
    }

    #[test]
    fn model_paths_honor_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_env("VOXPAD_TTS_MODEL_DIR", "/opt/models/kokoro");
        set_env("VOXPAD_STT_MODEL", "/opt/models/ggml-small.bin");
        let tts = tts_model_dir().unwrap();
        let stt = stt_model_path().unwrap();
        clear_env("VOXPAD_TTS_MODEL_DIR");
        clear_env("VOXPAD_STT_MODEL");
        assert_eq!(tts, PathBuf::from("/opt/models/kokoro"));
        assert_eq!(stt, PathBuf::from("/opt/models/ggml-small.bin"));
    }
}
