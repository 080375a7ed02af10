//! reelist-pb - Playlist Builder service
//!
//! Accepts a video upload over HTTP, extracts its audio track with the
//! external conversion tool, identifies the songs in it via the
//! fingerprinting vendor, and assembles a playlist of the matches on the
//! streaming provider. Everything is request-scoped; nothing persists
//! between requests.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use reelist_common::Config;

use crate::services::workflow::PlaylistWorkflow;

/// Upload size cap (bytes)
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workflow: Arc<PlaylistWorkflow>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Arc<Config>, workflow: Arc<PlaylistWorkflow>) -> Self {
        Self {
            config,
            workflow,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::upload_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
