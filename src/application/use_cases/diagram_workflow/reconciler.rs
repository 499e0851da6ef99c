use crate::ports::outbound::{DiagramDelta, DiagramRef, EventSubscription};
use crate::shared::{Result, WorkflowError};
use crate::threat_model::domain::Component;

/// Lifecycle of a subscription-backed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Subscribed,
    Completed,
    Errored,
}

/// Awaits the one `createdDiagramDescription` push for a new diagram.
///
/// The subscription is opened before the triggering mutation is sent,
/// so this job can be constructed holding a channel that is already
/// live when the service starts pushing.
pub struct DescriptionJob {
    diagram_id: String,
    subscription: EventSubscription<DiagramDelta>,
    state: JobState,
}

impl DescriptionJob {
    pub fn new(diagram_id: String, subscription: EventSubscription<DiagramDelta>) -> Self {
        Self {
            diagram_id,
            subscription,
            state: JobState::Subscribed,
        }
    }

    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn abandon(&mut self) {
        self.subscription.close();
        self.state = JobState::Errored;
    }

    /// Consumes pushes until one carries a non-empty description, then
    /// closes the channel and returns the description.
    pub async fn await_description(&mut self) -> Result<String> {
        while let Some(delta) = self.subscription.recv().await {
            match delta.diagram_description {
                Some(description) if !description.is_empty() => {
                    self.subscription.close();
                    self.state = JobState::Completed;
                    return Ok(description);
                }
                _ => continue,
            }
        }
        self.state = JobState::Errored;
        Err(WorkflowError::SubscriptionError {
            channel: "createdDiagramDescription",
            details: "channel closed before a description arrived".to_string(),
        }
        .into())
    }
}

/// Awaits the one `extractedComponents` push for a diagram.
pub struct ExtractionJob {
    diagram_id: String,
    subscription: EventSubscription<DiagramDelta>,
    state: JobState,
}

impl ExtractionJob {
    pub fn new(diagram_id: String, subscription: EventSubscription<DiagramDelta>) -> Self {
        Self {
            diagram_id,
            subscription,
            state: JobState::Subscribed,
        }
    }

    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Consumes pushes until one carries components, then closes the
    /// channel and returns them.
    pub async fn await_components(&mut self) -> Result<Vec<Component>> {
        while let Some(delta) = self.subscription.recv().await {
            if !delta.components.is_empty() {
                self.subscription.close();
                self.state = JobState::Completed;
                return Ok(delta.components);
            }
        }
        self.state = JobState::Errored;
        Err(WorkflowError::SubscriptionError {
            channel: "extractedComponents",
            details: "channel closed before components arrived".to_string(),
        }
        .into())
    }
}

/// One step of a threat-generation job.
#[derive(Debug)]
pub enum GenerationEvent {
    /// A per-component batch arrived on `generatedThreats`.
    Batch(DiagramDelta),
    /// `generatedAllThreats` fired; both channels are now closed.
    Completed,
}

/// Drives the two parallel channels of a threat-generation job: the
/// incremental `generatedThreats` stream and the one-shot
/// `generatedAllThreats` completion signal.
pub struct GenerationJob {
    diagram_id: String,
    deltas: EventSubscription<DiagramDelta>,
    completion: EventSubscription<DiagramRef>,
    state: JobState,
}

impl GenerationJob {
    pub fn new(
        diagram_id: String,
        deltas: EventSubscription<DiagramDelta>,
        completion: EventSubscription<DiagramRef>,
    ) -> Self {
        Self {
            diagram_id,
            deltas,
            completion,
            state: JobState::Subscribed,
        }
    }

    pub fn diagram_id(&self) -> &str {
        &self.diagram_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state != JobState::Subscribed
    }

    /// Next generation event. Batches queued ahead of the completion
    /// signal are always drained first, so no per-component results are
    /// lost when the job finishes. On completion both subscriptions are
    /// closed and further calls return an error.
    pub async fn next_event(&mut self) -> Result<GenerationEvent> {
        if self.state != JobState::Subscribed {
            return Err(WorkflowError::SubscriptionError {
                channel: "generatedThreats",
                details: "generation job already finished".to_string(),
            }
            .into());
        }
        // `biased` polls the delta channel first on every turn; the
        // completion signal only wins once no batch is waiting.
        tokio::select! {
            biased;
            delta = self.deltas.recv() => match delta {
                Some(delta) => Ok(GenerationEvent::Batch(delta)),
                None => {
                    self.state = JobState::Errored;
                    self.completion.close();
                    Err(WorkflowError::SubscriptionError {
                        channel: "generatedThreats",
                        details: "channel closed before generation completed".to_string(),
                    }
                    .into())
                }
            },
            done = self.completion.recv() => match done {
                Some(_) => {
                    self.state = JobState::Completed;
                    self.deltas.close();
                    self.completion.close();
                    Ok(GenerationEvent::Completed)
                }
                None => {
                    self.state = JobState::Errored;
                    self.deltas.close();
                    Err(WorkflowError::SubscriptionError {
                        channel: "generatedAllThreats",
                        details: "channel closed before generation completed".to_string(),
                    }
                    .into())
                }
            },
        }
    }
}
