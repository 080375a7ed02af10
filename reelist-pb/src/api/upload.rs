//! Video upload endpoint
//!
//! POST /upload drives the whole pipeline for a single video: scratch the
//! upload, extract audio, identify songs, assemble the playlist, answer
//! with its URL. Client mistakes (missing field, empty file, non-video
//! extension) fail fast before anything external is touched.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::IdentifiedSong;
use crate::services::scratch::ScratchFile;
use crate::AppState;

/// Accepted upload extensions (video containers)
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v"];

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL of the created playlist
    pub playlist_url: String,
    /// Identified songs without a catalog match (only when the service is
    /// configured to report them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<Vec<IdentifiedSong>>,
}

/// POST /upload
///
/// Multipart form with a binary `video` field (the original filename is
/// used only for its extension) and an optional `playlist_name` text field
/// overriding the configured default.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut video: Option<(String, axum::body::Bytes)> = None;
    let mut playlist_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("video") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read 'video' field: {e}"))
                })?;
                video = Some((file_name, bytes));
            }
            Some("playlist_name") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read 'playlist_name' field: {e}"))
                })?;
                if !text.trim().is_empty() {
                    playlist_name = Some(text);
                }
            }
            // Unknown fields are ignored
            _ => {}
        }
    }

    let (file_name, bytes) =
        video.ok_or_else(|| ApiError::BadRequest("Missing 'video' field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest(
            "Uploaded video file is empty".to_string(),
        ));
    }
    let extension = video_extension(&file_name).ok_or_else(|| {
        ApiError::BadRequest(format!("Not a supported video file: {file_name:?}"))
    })?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        file = %file_name,
        bytes = bytes.len(),
        "Video upload received"
    );

    // Scratch file is keyed by the request id and removed when this guard
    // drops, on success and error paths alike
    let scratch = ScratchFile::create(&state.config.scratch_dir, request_id, extension, &bytes)
        .await?;

    let name = playlist_name.as_deref().unwrap_or(&state.config.playlist_name);
    let outcome = state.workflow.run(scratch.path(), name).await?;

    tracing::info!(%request_id, playlist_url = %outcome.playlist.url, "Upload processed");

    let skipped = state.config.report_skipped.then_some(outcome.skipped);
    Ok(Json(UploadResponse {
        playlist_url: outcome.playlist.url,
        skipped,
    }))
}

/// Case-insensitive extension check against the accepted container list.
/// Returns the canonical (lowercase) extension for the scratch file name.
fn video_extension(file_name: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(file_name).extension()?.to_str()?;
    VIDEO_EXTENSIONS
        .iter()
        .copied()
        .find(|v| v.eq_ignore_ascii_case(extension))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_video))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extension_accepts_known_containers() {
        assert_eq!(video_extension("clip.mp4"), Some("mp4"));
        assert_eq!(video_extension("Holiday Reel.MOV"), Some("mov"));
        assert_eq!(video_extension("a.b.webm"), Some("webm"));
    }

    #[test]
    fn test_video_extension_rejects_everything_else() {
        assert_eq!(video_extension("notes.txt"), None);
        assert_eq!(video_extension("song.mp3"), None);
        assert_eq!(video_extension("no-extension"), None);
        assert_eq!(video_extension(""), None);
    }
}
