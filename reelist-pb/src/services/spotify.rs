//! Spotify playlist client
//!
//! Three operations against the provider's Web API: track search, playlist
//! creation and batch track insertion. Every call carries an access token
//! from [`SpotifyAuth`]; a 401/403 anywhere surfaces as an authorization
//! error and fails the request as a whole.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use reelist_common::config::SpotifyConfig;

use crate::models::{MatchedTrack, PlaylistSummary};
use crate::services::spotify_auth::SpotifyAuth;
use crate::services::workflow::PlaylistProvider;

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("reelist/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Playlist provider errors
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Track search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    uri: String,
}

/// Playlist creation response
#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    id: String,
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: String,
}

/// `GET /me` response
#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    auth: SpotifyAuth,
}

impl SpotifyClient {
    pub fn new(config: &SpotifyConfig) -> Result<Self, PlaylistError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PlaylistError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            auth: SpotifyAuth::new(config)?,
        })
    }

    /// Search the catalog by free-text `"<title> <artist>"` query.
    ///
    /// Only the first result, if any, is kept.
    pub async fn search_track(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<MatchedTrack>, PlaylistError> {
        let token = self.auth.access_token().await?;
        let query = format!("{title} {artist}");

        let response = self
            .http_client
            .get(format!("{API_BASE_URL}/search"))
            .bearer_auth(&token)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))?;

        let matched = Self::first_track_uri(results).map(|uri| MatchedTrack {
            title: title.to_string(),
            track_id: uri,
        });

        tracing::debug!(query = %query, matched = matched.is_some(), "Catalog search");

        Ok(matched)
    }

    /// Create a new, empty, publicly-visible playlist owned by the
    /// authenticated user.
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistSummary, PlaylistError> {
        let token = self.auth.access_token().await?;
        let user_id = self.current_user_id(&token).await?;

        let response = self
            .http_client
            .post(format!("{API_BASE_URL}/users/{user_id}/playlists"))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "name": name, "public": true }))
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;

        let playlist: PlaylistResponse = response
            .json()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))?;

        tracing::info!(playlist_id = %playlist.id, name = %name, "Playlist created");

        Ok(PlaylistSummary {
            id: playlist.id,
            url: playlist.external_urls.spotify,
        })
    }

    /// Append the given track identifiers to a playlist, in order, in one
    /// batch call.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), PlaylistError> {
        let token = self.auth.access_token().await?;

        let response = self
            .http_client
            .post(format!("{API_BASE_URL}/playlists/{playlist_id}/tracks"))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "uris": track_ids }))
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;
        error_for_status(response).await?;

        tracing::debug!(playlist_id = %playlist_id, tracks = track_ids.len(), "Tracks added");

        Ok(())
    }

    async fn current_user_id(&self, token: &str) -> Result<String, PlaylistError> {
        let response = self
            .http_client
            .get(format!("{API_BASE_URL}/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))?;

        Ok(user.id)
    }

    /// First result's provider track identifier, if the search hit anything.
    fn first_track_uri(results: SearchResponse) -> Option<String> {
        results.tracks.items.into_iter().next().map(|t| t.uri)
    }
}

/// Map authorization failures and other non-2xx responses to their error
/// variants, passing successful responses through.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, PlaylistError> {
    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        let body = response.text().await.unwrap_or_default();
        return Err(PlaylistError::Unauthorized(format!("{status}: {body}")));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PlaylistError::Api(status.as_u16(), body));
    }
    Ok(response)
}

#[async_trait::async_trait]
impl PlaylistProvider for SpotifyClient {
    async fn search_track(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<MatchedTrack>, PlaylistError> {
        SpotifyClient::search_track(self, title, artist).await
    }

    async fn create_playlist(&self, name: &str) -> Result<PlaylistSummary, PlaylistError> {
        SpotifyClient::create_playlist(self, name).await
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), PlaylistError> {
        SpotifyClient::add_tracks(self, playlist_id, track_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_track_uri_takes_first_result() {
        let results: SearchResponse = serde_json::from_str(
            r#"{
                "tracks": {
                    "items": [
                        {"uri": "spotify:track:first", "name": "A"},
                        {"uri": "spotify:track:second", "name": "A (Live)"}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            SpotifyClient::first_track_uri(results),
            Some("spotify:track:first".to_string())
        );
    }

    #[test]
    fn test_first_track_uri_empty_results() {
        let results: SearchResponse =
            serde_json::from_str(r#"{"tracks": {"items": []}}"#).unwrap();
        assert_eq!(SpotifyClient::first_track_uri(results), None);
    }

    #[test]
    fn test_playlist_response_parsing() {
        let playlist: PlaylistResponse = serde_json::from_str(
            r#"{
                "id": "3cEYpjA9oz9GiPac4AsH4n",
                "external_urls": {
                    "spotify": "https://open.spotify.com/playlist/3cEYpjA9oz9GiPac4AsH4n"
                },
                "public": true
            }"#,
        )
        .unwrap();

        assert_eq!(playlist.id, "3cEYpjA9oz9GiPac4AsH4n");
        assert_eq!(
            playlist.external_urls.spotify,
            "https://open.spotify.com/playlist/3cEYpjA9oz9GiPac4AsH4n"
        );
    }
}
