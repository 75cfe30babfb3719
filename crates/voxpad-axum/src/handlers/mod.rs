//! HTTP handlers.
//!
//! Handlers are thin wrappers — each calls exactly one `SpeechService`
//! method and returns the result as JSON. Request/response shapes are
//! co-located with the handlers that use them.

pub mod audio;
pub mod speech;
pub mod transcribe;

use serde::Serialize;

/// Body returned when a job is accepted: `{"status":"ok"}`.
#[derive(Serialize)]
pub struct Ack {
    status: &'static str,
}

impl Ack {
    pub(crate) const fn ok() -> Self {
        Self { status: "ok" }
    }
}
