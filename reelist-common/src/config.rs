//! Configuration loading and validation
//!
//! Config file resolution follows the usual priority order:
//! 1. Explicit path (command-line argument)
//! 2. `REELIST_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/reelist/config.toml` on Linux)
//!
//! Credentials may additionally be supplied per-field via `REELIST_*`
//! environment variables, which take precedence over the TOML file. A value
//! present in both places logs a warning so misconfiguration is visible.
//!
//! Provider credentials are never compiled in; `validate()` fails startup
//! with a guidance message when any of them is missing.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "REELIST_CONFIG";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Playlist name used when the upload does not supply one
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,

    /// Include unmatched songs in the upload response
    #[serde(default)]
    pub report_skipped: bool,

    /// Directory for request-scoped scratch files
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Media conversion tool executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Fingerprinting service credentials
    #[serde(default)]
    pub acrcloud: AcrCloudConfig,

    /// Playlist provider credentials
    #[serde(default)]
    pub spotify: SpotifyConfig,
}

/// ACRCloud identification credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AcrCloudConfig {
    /// Identification endpoint host
    #[serde(default = "default_acr_host")]
    pub host: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub access_secret: String,
}

/// Spotify application credentials plus a pre-obtained refresh token
/// (the interactive consent flow that mints it happens out-of-band)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub refresh_token: String,
}

fn default_port() -> u16 {
    5741
}

fn default_playlist_name() -> String {
    "My Movie Playlist".to_string()
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("reelist")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_acr_host() -> String {
    "identify-eu-west-1.acrcloud.com".to_string()
}

impl Default for AcrCloudConfig {
    fn default() -> Self {
        Self {
            host: default_acr_host(),
            access_key: String::new(),
            access_secret: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            playlist_name: default_playlist_name(),
            report_skipped: false,
            scratch_dir: default_scratch_dir(),
            ffmpeg_path: default_ffmpeg_path(),
            acrcloud: AcrCloudConfig::default(),
            spotify: SpotifyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the resolved TOML file (if any), then apply
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(explicit) {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                let content = std::fs::read_to_string(&path)?;
                let config: Config = toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("Failed to parse {}: {e}", path.display()))
                })?;
                info!("Configuration loaded from {}", path.display());
                config
            }
            None => {
                warn!("No config file found, relying on defaults and environment variables");
                Config::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve the config file path: explicit argument, then the
    /// `REELIST_CONFIG` environment variable, then the platform default
    /// location (only if a file actually exists there).
    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir()
            .map(|d| d.join("reelist").join("config.toml"))
            .filter(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        override_from_env(
            &mut self.acrcloud.host,
            "REELIST_ACR_HOST",
            "acrcloud.host",
        );
        override_from_env(
            &mut self.acrcloud.access_key,
            "REELIST_ACR_ACCESS_KEY",
            "acrcloud.access_key",
        );
        override_from_env(
            &mut self.acrcloud.access_secret,
            "REELIST_ACR_ACCESS_SECRET",
            "acrcloud.access_secret",
        );
        override_from_env(
            &mut self.spotify.client_id,
            "REELIST_SPOTIFY_CLIENT_ID",
            "spotify.client_id",
        );
        override_from_env(
            &mut self.spotify.client_secret,
            "REELIST_SPOTIFY_CLIENT_SECRET",
            "spotify.client_secret",
        );
        override_from_env(
            &mut self.spotify.redirect_uri,
            "REELIST_SPOTIFY_REDIRECT_URI",
            "spotify.redirect_uri",
        );
        override_from_env(
            &mut self.spotify.refresh_token,
            "REELIST_SPOTIFY_REFRESH_TOKEN",
            "spotify.refresh_token",
        );
    }

    /// Verify every provider credential is present. Called once at startup
    /// so a misconfigured service fails before accepting uploads.
    pub fn validate(&self) -> Result<()> {
        let required = [
            (
                "acrcloud.access_key",
                &self.acrcloud.access_key,
                "REELIST_ACR_ACCESS_KEY",
            ),
            (
                "acrcloud.access_secret",
                &self.acrcloud.access_secret,
                "REELIST_ACR_ACCESS_SECRET",
            ),
            (
                "spotify.client_id",
                &self.spotify.client_id,
                "REELIST_SPOTIFY_CLIENT_ID",
            ),
            (
                "spotify.client_secret",
                &self.spotify.client_secret,
                "REELIST_SPOTIFY_CLIENT_SECRET",
            ),
            (
                "spotify.redirect_uri",
                &self.spotify.redirect_uri,
                "REELIST_SPOTIFY_REDIRECT_URI",
            ),
            (
                "spotify.refresh_token",
                &self.spotify.refresh_token,
                "REELIST_SPOTIFY_REFRESH_TOKEN",
            ),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value, _)| !is_present(value))
            .map(|(key, _, env)| format!("{key} (env: {env})"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Missing credentials: {}.\n\
                 Configure them in the TOML config file (--config or {CONFIG_ENV}) \
                 or via the listed environment variables.",
                missing.join(", ")
            )))
        }
    }
}

/// Credential validity check (non-empty, non-whitespace)
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn override_from_env(field: &mut String, env_var: &str, toml_key: &str) {
    if let Ok(value) = std::env::var(env_var) {
        if value.trim().is_empty() {
            return;
        }
        if is_present(field) {
            warn!("{toml_key} set in both TOML and {env_var}, using {env_var}");
        }
        *field = value;
    }
}
