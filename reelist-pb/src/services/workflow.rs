//! Playlist-building workflow
//!
//! Sequences audio extraction → song identification → per-song catalog
//! search → playlist creation → batch track insertion. Strictly sequential
//! with no retries: any external failure aborts the request and no partial
//! playlist is returned. Catalog misses are not failures; the affected
//! songs are skipped and the rest proceed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use reelist_common::Config;

use crate::models::{IdentifiedSong, MatchedTrack, PlaylistSummary, WorkflowOutcome};
use crate::services::acrcloud::{AcrCloudClient, FingerprintError};
use crate::services::audio_extractor::{AudioExtractor, ConversionError};
use crate::services::scratch::ScratchFile;
use crate::services::spotify::{PlaylistError, SpotifyClient};

/// Song identification seam, implemented by the fingerprinting client
#[async_trait]
pub trait SongIdentifier: Send + Sync {
    async fn identify(&self, audio_path: &Path) -> Result<Vec<IdentifiedSong>, FingerprintError>;
}

/// Playlist provider seam, implemented by the Spotify client
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    async fn search_track(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<MatchedTrack>, PlaylistError>;

    async fn create_playlist(&self, name: &str) -> Result<PlaylistSummary, PlaylistError>;

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String])
        -> Result<(), PlaylistError>;
}

/// Workflow errors, one per pipeline stage
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Audio conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Song identification failed: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Playlist provider failed: {0}")]
    Playlist(#[from] PlaylistError),
}

/// The end-to-end workflow
pub struct PlaylistWorkflow {
    extractor: AudioExtractor,
    identifier: Arc<dyn SongIdentifier>,
    playlists: Arc<dyn PlaylistProvider>,
}

impl PlaylistWorkflow {
    pub fn new(
        extractor: AudioExtractor,
        identifier: Arc<dyn SongIdentifier>,
        playlists: Arc<dyn PlaylistProvider>,
    ) -> Self {
        Self {
            extractor,
            identifier,
            playlists,
        }
    }

    /// Wire up the production clients from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let identifier = Arc::new(AcrCloudClient::new(&config.acrcloud)?);
        let playlists = Arc::new(SpotifyClient::new(&config.spotify)?);
        Ok(Self::new(
            AudioExtractor::new(config.ffmpeg_path.clone()),
            identifier,
            playlists,
        ))
    }

    /// Run the full pipeline for one uploaded video, returning the created
    /// playlist together with what was matched and what was skipped.
    pub async fn run(
        &self,
        video_path: &Path,
        playlist_name: &str,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let audio_path = self.extractor.extract(video_path).await?;
        // The derived audio is scratch too: deleted on every exit path
        let _audio_guard = ScratchFile::adopt(audio_path.clone());

        let songs = self.identifier.identify(&audio_path).await?;

        let mut matched = Vec::new();
        let mut skipped = Vec::new();
        for song in songs {
            match self
                .playlists
                .search_track(&song.title, &song.artist)
                .await?
            {
                Some(track) => matched.push(track),
                None => {
                    info!(title = %song.title, artist = %song.artist, "No catalog match, skipping");
                    skipped.push(song);
                }
            }
        }

        let playlist = self.playlists.create_playlist(playlist_name).await?;

        if !matched.is_empty() {
            let track_ids: Vec<String> = matched.iter().map(|t| t.track_id.clone()).collect();
            self.playlists.add_tracks(&playlist.id, &track_ids).await?;
        }

        info!(
            playlist_id = %playlist.id,
            tracks = matched.len(),
            skipped = skipped.len(),
            "Playlist assembled"
        );

        Ok(WorkflowOutcome {
            playlist,
            matched,
            skipped,
        })
    }
}
