//! Image storage service
//!
//! Persists uploaded images under UUID filenames in the configured
//! upload directory, enforcing the MIME allow-list and size ceiling.

use crate::config::UploadConfig;
use anyhow::Context;
use uuid::Uuid;

/// Error types for image storage operations
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("File type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("File exceeds the maximum size of {0} bytes")]
    TooLarge(u64),

    #[error("Image file is required")]
    Missing,

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Stores and removes image files on the local filesystem
pub struct ImageStorage {
    config: UploadConfig,
}

impl ImageStorage {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Save image bytes under a fresh UUID filename.
    ///
    /// Returns the stored filename. The MIME type must be on the
    /// allow-list and the payload must fit the configured ceiling.
    pub async fn save(&self, data: &[u8], content_type: &str) -> Result<String, ImageError> {
        if data.is_empty() {
            return Err(ImageError::Missing);
        }
        if !self.config.is_type_allowed(content_type) {
            return Err(ImageError::UnsupportedType(content_type.to_string()));
        }
        if data.len() as u64 > self.config.max_file_size {
            return Err(ImageError::TooLarge(self.config.max_file_size));
        }

        tokio::fs::create_dir_all(&self.config.path)
            .await
            .context("Failed to create upload directory")?;

        let ext = self.config.get_extension(content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.config.path.join(&filename);

        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write image file: {:?}", path))?;

        tracing::debug!(file = %filename, size = data.len(), "Stored image");

        Ok(filename)
    }

    /// Remove a stored image by filename.
    ///
    /// Best-effort: a missing file is not an error. Names with path
    /// components are rejected.
    pub async fn remove(&self, filename: &str) -> Result<(), ImageError> {
        if filename.is_empty() || filename.contains('/') || filename.contains("..") {
            return Ok(());
        }

        let path = self.config.path.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::InternalError(
                anyhow::anyhow!(e).context(format!("Failed to remove image file: {:?}", path)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn storage_in(dir: &std::path::Path) -> ImageStorage {
        ImageStorage::new(UploadConfig {
            path: PathBuf::from(dir),
            max_file_size: 1024,
            ..UploadConfig::default()
        })
    }

    #[tokio::test]
    async fn test_save_and_remove_roundtrip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        let filename = storage
            .save(b"fake png bytes", "image/png")
            .await
            .expect("Save should succeed");

        assert!(filename.ends_with(".png"));
        let path = dir.path().join(&filename);
        assert!(path.exists());
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"fake png bytes");

        storage.remove(&filename).await.expect("Remove should succeed");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_rejects_disallowed_type() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        let result = storage.save(b"%PDF-1.4", "application/pdf").await;
        assert!(matches!(result, Err(ImageError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        let big = vec![0u8; 2048];
        let result = storage.save(&big, "image/png").await;
        assert!(matches!(result, Err(ImageError::TooLarge(1024))));
    }

    #[tokio::test]
    async fn test_save_rejects_empty_payload() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        let result = storage.save(b"", "image/png").await;
        assert!(matches!(result, Err(ImageError::Missing)));
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        storage
            .remove("does-not-exist.png")
            .await
            .expect("Removing a missing file should not error");
    }

    #[tokio::test]
    async fn test_remove_ignores_path_traversal() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        storage
            .remove("../outside.png")
            .await
            .expect("Traversal names are ignored");
    }

    #[tokio::test]
    async fn test_unique_filenames() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = storage_in(dir.path());

        let a = storage.save(b"one", "image/jpeg").await.unwrap();
        let b = storage.save(b"two", "image/jpeg").await.unwrap();

        assert_ne!(a, b);
        assert!(a.ends_with(".jpg"));
    }
}
