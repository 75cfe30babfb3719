//! Artifact serving.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::HttpError;
use crate::state::AppState;

/// `GET /audio/{filename}`
///
/// Serves a generated artifact as `audio/mp4`. The filename is a single
/// path segment; anything that could escape the audio directory is
/// rejected outright.
pub async fn artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(HttpError::BadRequest("Invalid filename".to_string()));
    }

    let path = state.service.audio_dir().join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HttpError::NotFound(format!("No such audio file: {filename}"))
        } else {
            HttpError::Internal(e.to_string())
        }
    })?;

    Ok(([(header::CONTENT_TYPE, "audio/mp4")], bytes))
}
