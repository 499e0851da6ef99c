use crate::ports::outbound::{DiagramDelta, DiagramEvents, DiagramRef, EventSubscription};
use crate::shared::Result;
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::mpsc;

/// How many pushes may queue up per channel before the producer waits.
const CHANNEL_CAPACITY: usize = 16;

/// Incremental server-sent-events parser. Fed raw network chunks, it
/// yields the `data:` payload of each complete event; comment and
/// `event:` lines are ignored.
#[derive(Debug, Default)]
struct SseParser {
    buffer: String,
    data_lines: Vec<String>,
}

impl SseParser {
    fn new() -> Self {
        Self::default()
    }

    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut payloads = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(data) = line.strip_prefix("data:") {
                self.data_lines.push(data.trim_start().to_string());
            } else if line.is_empty() && !self.data_lines.is_empty() {
                payloads.push(self.data_lines.join("\n"));
                self.data_lines.clear();
            }
        }
        payloads
    }
}

/// Unwraps a pushed payload down to the per-channel object. The service
/// wraps pushes in the usual GraphQL shape (`{"data": {"<channel>":
/// {...}}}`); bare payloads are accepted too.
fn decode_event<T: DeserializeOwned>(channel: &str, payload: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let inner = match &value["data"][channel] {
        serde_json::Value::Null => match &value[channel] {
            serde_json::Value::Null => &value,
            nested => nested,
        },
        nested => nested,
    };
    Ok(serde_json::from_value(inner.clone())?)
}

/// SseDiagramEvents adapter for the service's push channels
///
/// Implements the DiagramEvents port over GraphQL-subscription results
/// delivered as server-sent events. Each subscribe call opens one
/// streaming GET; a spawned task parses frames into typed events and
/// forwards them over a bounded channel. Dropping the returned
/// subscription aborts that task, which hangs up the stream.
pub struct SseDiagramEvents {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SseDiagramEvents {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        // No total timeout: these streams stay open for as long as the
        // job runs. Only the connect phase is bounded.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("threatflow/{}", version))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    async fn subscribe<T>(&self, channel: &'static str, id: &str) -> Result<EventSubscription<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = format!(
            "{}/subscriptions/{}?id={}",
            self.endpoint.trim_end_matches('/'),
            channel,
            urlencoding::encode(id)
        );
        let mut request = self.client.get(&url).header("accept", "text/event-stream");
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "subscription '{}' returned status code {}",
                channel,
                response.status()
            );
        }

        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let mut stream = response.bytes_stream();
        let guard = tokio::spawn(async move {
            let mut parser = SseParser::new();
            while let Some(chunk) = stream.next().await {
                let Ok(chunk) = chunk else {
                    break;
                };
                for payload in parser.feed(&chunk) {
                    // Frames that do not decode are keep-alives or
                    // unrelated notices; skip them.
                    let Ok(event) = decode_event::<T>(channel, &payload) else {
                        continue;
                    };
                    if sender.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(EventSubscription::new(receiver, Some(guard)))
    }
}

#[async_trait]
impl DiagramEvents for SseDiagramEvents {
    async fn created_diagram_description(
        &self,
        id: &str,
    ) -> Result<EventSubscription<DiagramDelta>> {
        self.subscribe("createdDiagramDescription", id).await
    }

    async fn extracted_components(&self, id: &str) -> Result<EventSubscription<DiagramDelta>> {
        self.subscribe("extractedComponents", id).await
    }

    async fn generated_threats(&self, id: &str) -> Result<EventSubscription<DiagramDelta>> {
        self.subscribe("generatedThreats", id).await
    }

    async fn generated_all_threats(&self, id: &str) -> Result<EventSubscription<DiagramRef>> {
        self.subscribe("generatedAllThreats", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_assembles_events_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: {\"id\":").is_empty());
        assert!(parser.feed(b" \"D1\"}\n").is_empty());
        let payloads = parser.feed(b"\n");
        assert_eq!(payloads, vec!["{\"id\": \"D1\"}".to_string()]);
    }

    #[test]
    fn test_parser_handles_crlf_and_comments() {
        let mut parser = SseParser::new();
        let payloads = parser.feed(b": keep-alive\r\nevent: push\r\ndata: {\"id\":\"D1\"}\r\n\r\n");
        assert_eq!(payloads, vec!["{\"id\":\"D1\"}".to_string()]);
    }

    #[test]
    fn test_parser_yields_multiple_events_from_one_chunk() {
        let mut parser = SseParser::new();
        let payloads = parser.feed(b"data: 1\n\ndata: 2\n\n");
        assert_eq!(payloads, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_decode_event_unwraps_graphql_shape() {
        let payload = r#"{ "data": { "generatedAllThreats": { "id": "D1" } } }"#;
        let event: DiagramRef = decode_event("generatedAllThreats", payload).unwrap();
        assert_eq!(event.id, "D1");
    }

    #[test]
    fn test_decode_event_accepts_bare_payload() {
        let payload = r#"{ "id": "D1" }"#;
        let event: DiagramRef = decode_event("generatedAllThreats", payload).unwrap();
        assert_eq!(event.id, "D1");
    }

    #[test]
    fn test_decode_event_rejects_keep_alive_frames() {
        assert!(decode_event::<DiagramRef>("generatedAllThreats", "{}").is_err());
    }
}
