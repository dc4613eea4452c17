/// Errors that can occur while storing or serving uploaded images.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested file was not found.
    #[error("image not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The upload exceeds the configured size limit.
    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
