//! Service layer: external clients, media conversion, and the workflow

pub mod acrcloud;
pub mod audio_extractor;
pub mod scratch;
pub mod signature;
pub mod spotify;
pub mod spotify_auth;
pub mod workflow;

pub use acrcloud::AcrCloudClient;
pub use audio_extractor::AudioExtractor;
pub use spotify::SpotifyClient;
pub use workflow::PlaylistWorkflow;
