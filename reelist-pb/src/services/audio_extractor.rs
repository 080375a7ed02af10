//! Audio extraction via the external media conversion tool
//!
//! Invokes ffmpeg to derive an audio file from an uploaded video,
//! discarding the video streams and keeping best-effort audio quality.
//! The tool's exit status and stderr are captured: a non-zero exit, a
//! failed launch or a missing output file each fail the request with a
//! typed conversion error.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Conversion tool errors
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        source: std::io::Error,
    },

    #[error("Conversion failed ({status}): {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Conversion produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// ffmpeg invocation wrapper
pub struct AudioExtractor {
    ffmpeg_path: PathBuf,
}

impl AudioExtractor {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Output path: same directory and stem as the input, mp3 container.
    pub fn derived_audio_path(video_path: &Path) -> PathBuf {
        video_path.with_extension("mp3")
    }

    /// Extract the audio track of `video_path` into a derived audio file,
    /// returning its path.
    pub async fn extract(&self, video_path: &Path) -> Result<PathBuf, ConversionError> {
        let audio_path = Self::derived_audio_path(video_path);

        debug!(
            video = %video_path.display(),
            audio = %audio_path.display(),
            "Extracting audio track"
        );

        // -vn drops the video streams, -q:a 0 keeps best-effort VBR quality,
        // -map a selects every audio stream
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(video_path)
            .arg("-vn")
            .arg("-q:a")
            .arg("0")
            .arg("-map")
            .arg("a")
            .arg("-y")
            .arg(&audio_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ConversionError::Launch {
                tool: self.ffmpeg_path.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(ConversionError::Failed {
                status: output.status,
                stderr,
            });
        }

        if !audio_path.exists() {
            return Err(ConversionError::MissingOutput(audio_path));
        }

        info!(audio = %audio_path.display(), "Audio extraction complete");

        Ok(audio_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_audio_path() {
        assert_eq!(
            AudioExtractor::derived_audio_path(Path::new("/tmp/scratch/abc.mp4")),
            PathBuf::from("/tmp/scratch/abc.mp3")
        );
    }

    #[tokio::test]
    async fn test_missing_tool_is_a_launch_error() {
        let extractor = AudioExtractor::new(PathBuf::from("/nonexistent/ffmpeg"));
        let err = extractor
            .extract(Path::new("/tmp/whatever.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_a_conversion_failure() {
        // `false` ignores its arguments and exits 1
        let extractor = AudioExtractor::new(PathBuf::from("false"));
        let err = extractor
            .extract(Path::new("/tmp/whatever.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::Failed { .. }));
    }
}
