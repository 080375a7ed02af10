//! Request-scoped scratch files
//!
//! Uploaded and derived media land in the scratch directory under a
//! generated request id and are removed when the guard drops, on success
//! and error paths alike. Keying by request id rather than the
//! client-supplied filename rules out collisions between concurrent
//! uploads and path traversal via crafted names.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// A file that is deleted when this guard goes out of scope
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Write `bytes` to `<dir>/<request_id>.<extension>`, creating the
    /// scratch directory if needed.
    pub async fn create(
        dir: &Path,
        request_id: Uuid,
        extension: &str,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{request_id}.{extension}"));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    /// Take ownership of a file produced beside a scratch file (e.g. the
    /// extracted audio) so it is cleaned up with the same guarantees.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove scratch file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_writes_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let request_id = Uuid::new_v4();

        let path = {
            let scratch = ScratchFile::create(dir.path(), request_id, "mp4", b"video bytes")
                .await
                .unwrap();
            let path = scratch.path().to_path_buf();
            assert_eq!(std::fs::read(&path).unwrap(), b"video bytes");
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("{request_id}.mp4")
            );
            path
        };

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_adopt_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derived.mp3");
        std::fs::write(&path, b"audio").unwrap();

        drop(ScratchFile::adopt(path.clone()));

        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        // Guard over a path that never existed must not panic
        drop(ScratchFile::adopt(PathBuf::from(
            "/tmp/reelist-test-never-created.mp3",
        )));
    }
}
