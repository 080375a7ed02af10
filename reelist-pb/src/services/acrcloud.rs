//! ACRCloud identification client
//!
//! Submits an audio sample to the vendor's identify endpoint and maps the
//! response to the songs it names. The response's `metadata.music` field is
//! the contract: an absent field is a malformed response, an empty list is
//! simply zero identified songs.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use reelist_common::config::AcrCloudConfig;

use crate::models::IdentifiedSong;
use crate::services::signature;
use crate::services::workflow::SongIdentifier;

const IDENTIFY_PATH: &str = "/v1/identify";
const DATA_TYPE: &str = "audio";
const SIGNATURE_VERSION: &str = "1";
const USER_AGENT: &str = concat!("reelist/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fingerprinting client errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unexpected response shape: {0}")]
    DataShape(String),

    #[error("Could not read audio sample: {0}")]
    Sample(#[from] std::io::Error),
}

/// Identification response. Only the fields the workflow consumes are
/// modelled; everything else the vendor sends is ignored.
#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    metadata: Option<IdentifyMetadata>,
}

#[derive(Debug, Deserialize)]
struct IdentifyMetadata {
    music: Option<Vec<MusicRecord>>,
}

#[derive(Debug, Deserialize)]
struct MusicRecord {
    title: String,
    #[serde(default)]
    artists: Vec<ArtistRecord>,
}

#[derive(Debug, Deserialize)]
struct ArtistRecord {
    name: String,
}

/// ACRCloud API client
pub struct AcrCloudClient {
    http_client: reqwest::Client,
    endpoint: String,
    access_key: String,
    access_secret: String,
}

impl AcrCloudClient {
    pub fn new(config: &AcrCloudConfig) -> Result<Self, FingerprintError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| FingerprintError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("https://{}{}", config.host, IDENTIFY_PATH),
            access_key: config.access_key.clone(),
            access_secret: config.access_secret.clone(),
        })
    }

    /// Identify the songs present in an audio file.
    ///
    /// Uploads the raw audio bytes together with the signed metadata fields
    /// the vendor requires and maps the response to identified songs.
    pub async fn identify(
        &self,
        audio_path: &Path,
    ) -> Result<Vec<IdentifiedSong>, FingerprintError> {
        let sample = tokio::fs::read(audio_path).await?;
        let sample_bytes = sample.len();
        let timestamp = chrono::Utc::now().timestamp();

        let string_to_sign = signature::string_to_sign(
            "POST",
            IDENTIFY_PATH,
            &self.access_key,
            DATA_TYPE,
            sample_bytes,
            timestamp,
        );
        let signature = signature::sign(&self.access_secret, &string_to_sign);

        let form = reqwest::multipart::Form::new()
            .text("access_key", self.access_key.clone())
            .text("sample_bytes", sample_bytes.to_string())
            .text("data_type", DATA_TYPE)
            .text("signature_version", SIGNATURE_VERSION)
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .part(
                "sample",
                reqwest::multipart::Part::bytes(sample).file_name("sample"),
            );

        tracing::debug!(sample_bytes, "Submitting audio sample for identification");

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FingerprintError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FingerprintError::Api(status.as_u16(), error_text));
        }

        let identify_response: IdentifyResponse = response
            .json()
            .await
            .map_err(|e| FingerprintError::Parse(e.to_string()))?;

        let songs = Self::songs_from_response(identify_response)?;

        tracing::info!(songs = songs.len(), "Identification complete");

        Ok(songs)
    }

    /// Map an identification response to the songs it names.
    ///
    /// `metadata.music` must be present; indexing into a missing field is
    /// exactly the failure mode this guards against. An empty list is a
    /// valid "no songs identified" result.
    fn songs_from_response(
        response: IdentifyResponse,
    ) -> Result<Vec<IdentifiedSong>, FingerprintError> {
        let music = response
            .metadata
            .and_then(|m| m.music)
            .ok_or_else(|| FingerprintError::DataShape("response missing metadata.music".into()))?;

        music
            .into_iter()
            .map(|record| {
                let artist = record
                    .artists
                    .first()
                    .map(|a| a.name.clone())
                    .ok_or_else(|| {
                        FingerprintError::DataShape(format!(
                            "song {:?} has no credited artists",
                            record.title
                        ))
                    })?;
                Ok(IdentifiedSong {
                    title: record.title,
                    artist,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SongIdentifier for AcrCloudClient {
    async fn identify(&self, audio_path: &Path) -> Result<Vec<IdentifiedSong>, FingerprintError> {
        AcrCloudClient::identify(self, audio_path).await
    }
}
