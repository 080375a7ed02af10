//! Domain types shared across the playlist-building pipeline

use serde::{Deserialize, Serialize};

/// Song identified from the uploaded audio by the fingerprinting service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedSong {
    pub title: String,
    /// First credited artist, as reported by the fingerprinting service
    pub artist: String,
}

/// Catalog track resolved from an identified song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTrack {
    /// Title of the identified song this track was resolved from
    pub title: String,
    /// Opaque provider track identifier, used for playlist insertion
    pub track_id: String,
}

/// Playlist created on the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    /// Public URL of the playlist
    pub url: String,
}

/// Result of one end-to-end workflow run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    pub playlist: PlaylistSummary,
    /// Tracks added to the playlist, in identification order
    pub matched: Vec<MatchedTrack>,
    /// Identified songs with no catalog match
    pub skipped: Vec<IdentifiedSong>,
}
