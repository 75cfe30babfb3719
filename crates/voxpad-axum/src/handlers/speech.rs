//! Handlers for synthesis: start, poll, history, voice catalogue.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use voxpad_core::{HistoryEntry, JobState};
use voxpad_voice::{AdmissionError, VoiceInfo};

use crate::error::HttpError;
use crate::handlers::Ack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    /// Voice id; the server default is used when absent.
    pub voice: Option<String>,
}

/// Poll response for synthesis: `{state, filename, error}`.
#[derive(Debug, Serialize)]
pub struct SynthesisStatusResponse {
    pub state: JobState,
    pub filename: Option<String>,
    pub error: Option<String>,
}

/// `POST /api/generate`
///
/// Admission errors are the only synchronous failures; everything later
/// is reported through the status poll.
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Ack>, HttpError> {
    state
        .service
        .start_synthesis(&req.text, req.voice)
        .map_err(|e| match e {
            AdmissionError::EmptyInput => HttpError::BadRequest("No text provided".to_string()),
            AdmissionError::Busy(_) => {
                HttpError::Conflict("Generation already in progress".to_string())
            }
        })?;
    Ok(Json(Ack::ok()))
}

/// `GET /api/generate/status`
pub async fn generate_status(State(state): State<AppState>) -> Json<SynthesisStatusResponse> {
    let status = state.service.synthesis_status();
    Json(SynthesisStatusResponse {
        state: status.state,
        filename: status.result,
        error: status.error,
    })
}

/// `GET /api/history`
pub async fn history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.service.history())
}

/// `GET /api/voices`
pub async fn voices(State(state): State<AppState>) -> Json<Vec<VoiceInfo>> {
    Json(state.service.voices())
}
