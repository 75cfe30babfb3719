//! Axum web adapter for voxpad.
//!
//! Thin HTTP layer over [`voxpad_voice::SpeechService`]: request
//! validation and JSON shapes live here, all job semantics live in the
//! service. The gateway checks admission, spawns nothing itself, and
//! returns immediately; clients poll the status endpoints.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use bootstrap::{AppContext, CorsConfig, ServerConfig};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use state::AppState;

#[cfg(feature = "engines")]
pub use bootstrap::{bootstrap, start_server};
