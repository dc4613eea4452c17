use std::path::Path;

use async_trait::async_trait;

use super::error::StorageError;

/// URL prefix under which stored images are served.
pub const PUBLIC_URL_PREFIX: &str = "/uploads";

/// Storage for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an upload and return its storage path (`<upload_dir>/<key>`).
    ///
    /// The stored key is generated, so two uploads with the same original
    /// filename never collide.
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Read the full contents of a stored image by its basename.
    async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete a stored image by its storage path.
    ///
    /// Returns `true` if a file was deleted, `false` if none existed.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    /// Derive the client-facing URL for a storage path: `/uploads/<basename>`.
    fn public_url(&self, path: &str) -> String {
        let basename = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path);
        format!("{PUBLIC_URL_PREFIX}/{basename}")
    }
}
