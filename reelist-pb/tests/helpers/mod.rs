//! Shared test helpers: fake service seams, stub conversion tools and
//! ready-made configuration.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use reelist_common::config::{AcrCloudConfig, Config, SpotifyConfig};
use reelist_pb::models::{IdentifiedSong, MatchedTrack, PlaylistSummary};
use reelist_pb::services::acrcloud::FingerprintError;
use reelist_pb::services::spotify::PlaylistError;
use reelist_pb::services::workflow::{PlaylistProvider, SongIdentifier};

pub fn song(title: &str, artist: &str) -> IdentifiedSong {
    IdentifiedSong {
        title: title.to_string(),
        artist: artist.to_string(),
    }
}

/// Fake fingerprinting seam returning a fixed song list (or a data-shape
/// error) and counting invocations.
#[derive(Default)]
pub struct FakeIdentifier {
    songs: Vec<IdentifiedSong>,
    fail_with_shape_error: bool,
    calls: Mutex<u32>,
}

impl FakeIdentifier {
    pub fn with_songs(songs: Vec<IdentifiedSong>) -> Self {
        Self {
            songs,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_with_shape_error: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SongIdentifier for FakeIdentifier {
    async fn identify(&self, _audio_path: &Path) -> Result<Vec<IdentifiedSong>, FingerprintError> {
        *self.calls.lock().unwrap() += 1;
        if self.fail_with_shape_error {
            return Err(FingerprintError::DataShape(
                "response missing metadata.music".to_string(),
            ));
        }
        Ok(self.songs.clone())
    }
}

pub const FAKE_PLAYLIST_ID: &str = "fake-playlist";
pub const FAKE_PLAYLIST_URL: &str = "https://open.spotify.com/playlist/fake-playlist";

/// Fake playlist provider: a fixed (title, artist) → track id catalog that
/// records every playlist creation and track batch it sees.
#[derive(Default)]
pub struct FakeCatalog {
    matches: HashMap<(String, String), String>,
    created: Mutex<Vec<String>>,
    added: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeCatalog {
    pub fn with_matches(entries: &[(&str, &str, &str)]) -> Self {
        let matches = entries
            .iter()
            .map(|(title, artist, id)| {
                ((title.to_string(), artist.to_string()), id.to_string())
            })
            .collect();
        Self {
            matches,
            ..Default::default()
        }
    }

    pub fn created_playlists(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn added_batches(&self) -> Vec<(String, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistProvider for FakeCatalog {
    async fn search_track(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<MatchedTrack>, PlaylistError> {
        Ok(self
            .matches
            .get(&(title.to_string(), artist.to_string()))
            .map(|id| MatchedTrack {
                title: title.to_string(),
                track_id: id.clone(),
            }))
    }

    async fn create_playlist(&self, name: &str) -> Result<PlaylistSummary, PlaylistError> {
        self.created.lock().unwrap().push(name.to_string());
        Ok(PlaylistSummary {
            id: FAKE_PLAYLIST_ID.to_string(),
            url: FAKE_PLAYLIST_URL.to_string(),
        })
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), PlaylistError> {
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), track_ids.to_vec()));
        Ok(())
    }
}

/// Stub conversion tool that copies its input ($2) to its output (last
/// argument), mimicking a successful ffmpeg run.
pub fn stub_ffmpeg_ok(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ffmpeg-ok.sh",
        "#!/bin/sh\nfor arg in \"$@\"; do out=\"$arg\"; done\ncp \"$2\" \"$out\"\n",
    )
}

/// Stub conversion tool that fails with a diagnostic on stderr.
pub fn stub_ffmpeg_failing(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "ffmpeg-fail.sh",
        "#!/bin/sh\necho 'conversion exploded' >&2\nexit 1\n",
    )
}

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

pub fn write_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"fake video bytes").unwrap();
    path
}

pub fn test_config(scratch_dir: PathBuf, ffmpeg_path: PathBuf) -> Config {
    Config {
        port: 0,
        playlist_name: "My Movie Playlist".to_string(),
        report_skipped: false,
        scratch_dir,
        ffmpeg_path,
        acrcloud: AcrCloudConfig {
            host: "identify-eu-west-1.acrcloud.com".to_string(),
            access_key: "test-key".to_string(),
            access_secret: "test-secret".to_string(),
        },
        spotify: SpotifyConfig {
            client_id: "test-id".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:5741/callback".to_string(),
            refresh_token: "test-refresh".to_string(),
        },
    }
}
