use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::error::StorageError;
use super::traits::ImageStore;

/// Filesystem-backed image store.
///
/// Uploads land in a flat directory under generated `<uuid>.<ext>` keys;
/// writes go through a `.tmp` staging file and are renamed into place.
pub struct FilesystemImageStore {
    upload_dir: PathBuf,
    max_size: u64,
}

impl FilesystemImageStore {
    /// Create a new image store, creating the upload directory if missing.
    pub async fn new(upload_dir: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&upload_dir).await?;
        fs::create_dir_all(upload_dir.join(".tmp")).await?;
        Ok(Self {
            upload_dir,
            max_size,
        })
    }

    /// Directory that stored images live in.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.upload_dir.join(".tmp").join(Uuid::new_v4().to_string())
    }

    /// Generate a collision-resistant storage key for an upload.
    fn storage_key(original_name: &str) -> String {
        match sanitized_extension(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        }
    }
}

/// Extension of the original filename, kept only when it is short ASCII
/// alphanumeric text; anything else is dropped from the stored key.
fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 16 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let key = Self::storage_key(original_name);
        let final_path = self.upload_dir.join(&key);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(final_path.to_string_lossy().into_owned())
    }

    async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.upload_dir.join(filename);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
