use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use threatflow::ports::outbound::{DiagramDelta, DiagramEvents, DiagramRef, EventSubscription};
use threatflow::shared::Result;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 16;

/// Mock DiagramEvents replaying scripted pushes per channel.
///
/// The senders are parked in the mock so the channels stay open after
/// the scripted events are buffered; jobs observe a live subscription
/// that simply goes quiet, the way the real transport behaves between
/// pushes.
#[derive(Default)]
pub struct MockDiagramEvents {
    descriptions: Mutex<Vec<DiagramDelta>>,
    extractions: Mutex<Vec<DiagramDelta>>,
    threat_batches: Mutex<Vec<DiagramDelta>>,
    completions: Mutex<Vec<DiagramRef>>,
    parked_delta_senders: Arc<Mutex<Vec<mpsc::Sender<DiagramDelta>>>>,
    parked_ref_senders: Arc<Mutex<Vec<mpsc::Sender<DiagramRef>>>>,
}

impl MockDiagramEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(self, delta: DiagramDelta) -> Self {
        self.descriptions.lock().unwrap().push(delta);
        self
    }

    pub fn with_extraction(self, delta: DiagramDelta) -> Self {
        self.extractions.lock().unwrap().push(delta);
        self
    }

    pub fn with_threat_batch(self, delta: DiagramDelta) -> Self {
        self.threat_batches.lock().unwrap().push(delta);
        self
    }

    pub fn with_completion(self, reference: DiagramRef) -> Self {
        self.completions.lock().unwrap().push(reference);
        self
    }

    fn subscription_for_deltas(
        &self,
        scripted: Vec<DiagramDelta>,
    ) -> EventSubscription<DiagramDelta> {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        for delta in scripted {
            sender
                .try_send(delta)
                .unwrap_or_else(|_| panic!("scripted events exceed channel capacity"));
        }
        self.parked_delta_senders.lock().unwrap().push(sender);
        EventSubscription::new(receiver, None)
    }
}

#[async_trait]
impl DiagramEvents for MockDiagramEvents {
    async fn created_diagram_description(
        &self,
        _id: &str,
    ) -> Result<EventSubscription<DiagramDelta>> {
        let scripted = self.descriptions.lock().unwrap().drain(..).collect();
        Ok(self.subscription_for_deltas(scripted))
    }

    async fn extracted_components(&self, _id: &str) -> Result<EventSubscription<DiagramDelta>> {
        let scripted = self.extractions.lock().unwrap().drain(..).collect();
        Ok(self.subscription_for_deltas(scripted))
    }

    async fn generated_threats(&self, _id: &str) -> Result<EventSubscription<DiagramDelta>> {
        let scripted = self.threat_batches.lock().unwrap().drain(..).collect();
        Ok(self.subscription_for_deltas(scripted))
    }

    async fn generated_all_threats(&self, _id: &str) -> Result<EventSubscription<DiagramRef>> {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        for reference in self.completions.lock().unwrap().drain(..) {
            sender
                .try_send(reference)
                .unwrap_or_else(|_| panic!("scripted events exceed channel capacity"));
        }
        self.parked_ref_senders.lock().unwrap().push(sender);
        Ok(EventSubscription::new(receiver, None))
    }
}
