//! Handlers for transcription: upload + start, poll.

use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use uuid::Uuid;

use voxpad_core::JobState;
use voxpad_voice::AdmissionError;

use crate::error::HttpError;
use crate::handlers::Ack;
use crate::state::AppState;

/// Poll response for transcription: `{state, text, error}`.
#[derive(Debug, Serialize)]
pub struct TranscriptionStatusResponse {
    pub state: JobState,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// `POST /api/transcribe`
///
/// Takes a multipart upload (field `audio`), persists it to a scratch
/// file, and hands ownership of that file to the job runner. The runner
/// deletes the scratch file whatever the outcome; on admission rejection
/// the handler deletes it itself.
pub async fn start(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Ack>, HttpError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("audio") || field.file_name().is_some() {
            let ext = field
                .file_name()
                .and_then(|n| Path::new(n).extension().and_then(|e| e.to_str()))
                .unwrap_or("wav")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| HttpError::BadRequest(format!("Malformed upload: {e}")))?;
            upload = Some((bytes, ext));
            break;
        }
    }

    let Some((bytes, ext)) = upload else {
        return Err(HttpError::BadRequest("No file uploaded".to_string()));
    };
    if bytes.is_empty() {
        return Err(HttpError::BadRequest("No file uploaded".to_string()));
    }

    let scratch = state.upload_dir.join(format!("{}.{ext}", Uuid::new_v4()));
    tokio::fs::write(&scratch, &bytes)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to persist upload: {e}")))?;

    if let Err(e) = state.service.start_transcription(scratch.clone()) {
        let _ = tokio::fs::remove_file(&scratch).await;
        return Err(match e {
            AdmissionError::Busy(_) => {
                HttpError::Conflict("Transcription already in progress".to_string())
            }
            AdmissionError::EmptyInput => HttpError::BadRequest("No file uploaded".to_string()),
        });
    }
    Ok(Json(Ack::ok()))
}

/// `GET /api/transcribe/status`
pub async fn status(State(state): State<AppState>) -> Json<TranscriptionStatusResponse> {
    let status = state.service.transcription_status();
    Json(TranscriptionStatusResponse {
        state: status.state,
        text: status.result,
        error: status.error,
    })
}
