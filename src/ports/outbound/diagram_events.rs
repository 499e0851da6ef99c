use crate::shared::Result;
use crate::threat_model::domain::{null_to_default, Component, DiagramStatus};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Snapshot pushed by the service whenever an asynchronous job makes
/// progress on a diagram. Description, extraction and per-component
/// threat pushes all arrive in this shape; which fields are populated
/// depends on the channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDelta {
    pub id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub s3_prefix: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub user_description: String,
    #[serde(default)]
    pub diagram_description: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub components: Vec<Component>,
    #[serde(default)]
    pub status: Option<DiagramStatus>,
}

/// One-shot completion payload for `generatedAllThreats`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagramRef {
    pub id: String,
}

/// A live push channel for one diagram job.
///
/// The subscription stays open for as long as the owning job holds it;
/// dropping or closing it tears down the underlying transport so late
/// pushes are discarded rather than applied to state that no longer
/// expects them.
#[derive(Debug)]
pub struct EventSubscription<T> {
    receiver: mpsc::Receiver<T>,
    guard: Option<JoinHandle<()>>,
}

impl<T> EventSubscription<T> {
    pub fn new(receiver: mpsc::Receiver<T>, guard: Option<JoinHandle<()>>) -> Self {
        Self {
            receiver,
            guard,
        }
    }

    /// Next pushed event, or `None` once the channel has closed and all
    /// buffered events were consumed.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Closes the channel. Events already buffered remain readable via
    /// [`recv`](Self::recv); new pushes fail to send on the far side.
    pub fn close(&mut self) {
        self.receiver.close();
        if let Some(guard) = self.guard.take() {
            guard.abort();
        }
    }

    pub fn is_open(&self) -> bool {
        !self.receiver.is_closed()
    }
}

impl<T> Drop for EventSubscription<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// DiagramEvents port: the four subscription channels the service
/// pushes job results over, each keyed by diagram id.
///
/// Opening a channel must complete before the mutation that triggers
/// the job is sent, otherwise early pushes are lost.
#[async_trait]
pub trait DiagramEvents: Send + Sync {
    /// Fires when the generated narrative description is ready.
    async fn created_diagram_description(&self, id: &str) -> Result<EventSubscription<DiagramDelta>>;

    /// Fires when component extraction finishes.
    async fn extracted_components(&self, id: &str) -> Result<EventSubscription<DiagramDelta>>;

    /// Fires once per component as its threats are generated.
    async fn generated_threats(&self, id: &str) -> Result<EventSubscription<DiagramDelta>>;

    /// Fires exactly once, when every component's threats are done.
    async fn generated_all_threats(&self, id: &str) -> Result<EventSubscription<DiagramRef>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_subscription_rejects_new_pushes() {
        let (sender, receiver) = mpsc::channel(8);
        let mut subscription = EventSubscription::new(receiver, None);

        assert!(sender.send("early".to_string()).await.is_ok());
        subscription.close();
        assert!(sender.send("late".to_string()).await.is_err());

        // The early push is still readable after close.
        assert_eq!(subscription.recv().await.as_deref(), Some("early"));
        assert!(subscription.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_tears_down_channel() {
        let (sender, receiver) = mpsc::channel::<u32>(1);
        let subscription = EventSubscription::new(receiver, None);
        drop(subscription);
        assert!(sender.send(1).await.is_err());
    }

    #[test]
    fn test_delta_decodes_with_null_components() {
        let delta: DiagramDelta = serde_json::from_str(
            r#"{
                "id": "D1",
                "s3Prefix": "uploads/D1",
                "userDescription": null,
                "diagramDescription": "A payment flow",
                "components": null,
                "status": "NA"
            }"#,
        )
        .unwrap();
        assert_eq!(delta.id, "D1");
        assert_eq!(delta.user_description, "");
        assert!(delta.components.is_empty());
        assert_eq!(delta.diagram_description.as_deref(), Some("A payment flow"));
    }
}
