//! Spotify token collaborator
//!
//! Exchanges a pre-obtained refresh token for short-lived access tokens.
//! The interactive consent flow that mints the refresh token happens
//! out-of-band; this type only implements the refresh contract: the cached
//! access token is reused until five minutes before its expiry, after
//! which the next caller refreshes it. A refresh rejected by the accounts
//! service is an authorization error.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;

use reelist_common::config::SpotifyConfig;

use crate::services::spotify::PlaylistError;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = concat!("reelist/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Refresh this long before the provider-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Access-token provider for the playlist API
pub struct SpotifyAuth {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl SpotifyAuth {
    pub fn new(config: &SpotifyConfig) -> Result<Self, PlaylistError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PlaylistError::Network(e.to_string()))?;

        tracing::debug!(
            client_id = %config.client_id,
            redirect_uri = %config.redirect_uri,
            "Spotify credentials loaded"
        );

        Ok(Self {
            http_client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, refreshing it first if the cached one
    /// is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, PlaylistError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Refreshing playlist provider access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_str()),
        ];

        let response = self
            .http_client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            let body = response.text().await.unwrap_or_default();
            return Err(PlaylistError::Unauthorized(format!(
                "token refresh rejected ({status}): {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlaylistError::Api(status.as_u16(), body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + cache_lifetime(token.expires_in),
        });

        Ok(access_token)
    }
}

/// How long a freshly issued token is trusted for
fn cache_lifetime(expires_in: u64) -> Duration {
    Duration::from_secs(expires_in).saturating_sub(EXPIRY_MARGIN)
}
