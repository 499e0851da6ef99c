use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use threatflow::ports::outbound::{ObjectStore, ProgressFn};
use threatflow::shared::Result;

/// Mock ObjectStore recording uploads and serving a canned download.
#[derive(Default, Clone)]
pub struct MockObjectStore {
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
    download_body: Arc<Mutex<Vec<u8>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download_body(self, body: Vec<u8>) -> Self {
        *self.download_body.lock().unwrap() = body;
        self
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        on_progress: ProgressFn,
    ) -> Result<String> {
        let total = bytes.len() as u64;
        on_progress(total, total);
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len()));
        Ok(path.to_string())
    }

    async fn presigned_url(&self, path: &str, _expires_in: Duration) -> Result<String> {
        Ok(format!("https://storage.example.com/{}?sig=test", path))
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.download_body.lock().unwrap().clone())
    }
}
