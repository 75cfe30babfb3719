//! Shared application state type.

use std::sync::Arc;

use crate::bootstrap::AppContext;

/// Application state shared across all handlers.
///
/// An Arc-wrapped [`AppContext`] holding the speech service and the
/// upload scratch directory.
pub type AppState = Arc<AppContext>;
