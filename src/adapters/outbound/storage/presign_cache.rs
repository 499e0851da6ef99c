use crate::ports::outbound::{ObjectStore, ProgressFn};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// A cached link is treated as expired this long before it actually is,
/// so a link handed to the user cannot die mid-download.
const EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone)]
struct CachedUrl {
    url: String,
    expires_at: DateTime<Utc>,
}

/// CachingObjectStore wraps an ObjectStore and caches presigned URLs.
///
/// Decorator over any ObjectStore implementation: presign responses are
/// kept until shortly before they expire, and an upload to a path
/// invalidates any link cached for it. Uploads and downloads pass
/// straight through.
pub struct CachingObjectStore<S: ObjectStore> {
    inner: S,
    cache: Arc<DashMap<String, CachedUrl>>,
}

impl<S: ObjectStore> CachingObjectStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    #[cfg(test)]
    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for CachingObjectStore<S> {
    async fn upload(&self, path: &str, bytes: Vec<u8>, progress: ProgressFn) -> Result<String> {
        let stored = self.inner.upload(path, bytes, progress).await?;
        // The object changed; any cached link points at stale content.
        self.cache.remove(path);
        Ok(stored)
    }

    async fn presigned_url(&self, path: &str, expires_in: Duration) -> Result<String> {
        let now = Utc::now();
        if let Some(cached) = self.cache.get(path) {
            if cached.expires_at - ChronoDuration::seconds(EXPIRY_MARGIN_SECS) > now {
                return Ok(cached.url.clone());
            }
        }

        let url = self.inner.presigned_url(path, expires_in).await?;
        self.cache.insert(
            path.to_string(),
            CachedUrl {
                url: url.clone(),
                expires_at: now
                    + ChronoDuration::seconds(expires_in.as_secs().min(i64::MAX as u64) as i64),
            },
        );
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.inner.download(url).await
    }
}
