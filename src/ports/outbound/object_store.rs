use crate::shared::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Default lifetime for presigned links handed to the user.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(600);

/// Progress callback for uploads: (bytes sent, total bytes).
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// ObjectStore port for diagram images and exported reports.
///
/// Paths are store-relative keys such as `uploads/{diagram_id}/{filename}`;
/// the adapter owns bucket/endpoint details.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `bytes` under `path`, reporting progress as chunks go
    /// out. Returns the stored path.
    async fn upload(&self, path: &str, bytes: Vec<u8>, progress: ProgressFn) -> Result<String>;

    /// A time-limited URL for reading `path`.
    async fn presigned_url(&self, path: &str, expires_in: Duration) -> Result<String>;

    /// Fetches the body behind a presigned URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
