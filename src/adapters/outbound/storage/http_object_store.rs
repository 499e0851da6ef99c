use crate::ports::outbound::{ObjectStore, ProgressFn};
use crate::shared::Result;
use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;

/// Upload bodies are streamed in chunks of this size so the progress
/// callback fires as bytes actually go out.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct PresignResponse {
    url: String,
}

/// HttpObjectStore adapter for the diagram/report bucket
///
/// Implements the ObjectStore port against the storage gateway that
/// fronts the bucket: PUT for uploads, a presign endpoint for read
/// links, and plain GET for downloading through those links.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(format!("threatflow/{}", version))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Path segments are encoded individually so keys like
    /// `uploads/{id}/{filename}` keep their separators.
    fn object_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/objects/{}",
            self.endpoint.trim_end_matches('/'),
            encoded.join("/")
        )
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.header("x-api-key", api_key),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, progress: ProgressFn) -> Result<String> {
        let total = bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();

        let mut sent = 0u64;
        let body_stream = stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            progress(sent, total);
            Ok::<Vec<u8>, std::io::Error>(chunk)
        });

        let response = self
            .with_key(self.client.put(self.object_url(path)))
            .header("content-type", "application/octet-stream")
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("upload returned status code {}", response.status());
        }
        Ok(path.to_string())
    }

    async fn presigned_url(&self, path: &str, expires_in: Duration) -> Result<String> {
        let url = format!(
            "{}/presign/{}?expires={}",
            self.endpoint.trim_end_matches('/'),
            path.split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            expires_in.as_secs()
        );
        let response = self.with_key(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("presign returned status code {}", response.status());
        }
        let presigned: PresignResponse = response.json().await?;
        Ok(presigned.url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        // Presigned links carry their own auth; no api key header here.
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("download returned status code {}", response.status());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = HttpObjectStore::new("https://storage.example".to_string(), None);
        assert!(store.is_ok());
    }

    #[test]
    fn test_object_url_encodes_segments_but_keeps_separators() {
        let store =
            HttpObjectStore::new("https://storage.example/".to_string(), None).unwrap();
        let url = store.object_url("uploads/D1/my diagram.png");
        assert_eq!(
            url,
            "https://storage.example/objects/uploads/D1/my%20diagram.png"
        );
    }
}
