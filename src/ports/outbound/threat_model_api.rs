use crate::shared::Result;
use crate::threat_model::domain::{
    Component, ComponentType, Diagram, DiagramSummary, DreadScores, Threat, ThreatAction,
    ThreatType,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input for the `createDiagramDescription` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiagramInput {
    pub id: String,
    pub s3_prefix: String,
    pub user_description: String,
}

/// Input for the `extractComponents` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractComponentsInput {
    pub id: String,
    pub s3_prefix: String,
    pub diagram_description: String,
}

/// Threat as sent back to the service. Deliberately has no `reason`
/// field: dispositions captured locally never travel with generation
/// requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatInput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub threat_type: ThreatType,
    pub dread_scores: DreadScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ThreatAction>,
}

impl From<&Threat> for ThreatInput {
    fn from(threat: &Threat) -> Self {
        Self {
            id: threat.id.clone(),
            name: threat.name.clone(),
            description: threat.description.clone(),
            threat_type: threat.threat_type,
            dread_scores: threat.dread_scores,
            action: threat.action,
        }
    }
}

/// Component as sent back to the service, nested threats included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub component_type: ComponentType,
    pub threats: Vec<ThreatInput>,
}

impl From<&Component> for ComponentInput {
    fn from(component: &Component) -> Self {
        Self {
            id: component.id.clone(),
            name: component.name.clone(),
            description: component.description.clone(),
            component_type: component.component_type,
            threats: component.threats.iter().map(ThreatInput::from).collect(),
        }
    }
}

/// Input for the `generateThreats` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThreatsInput {
    pub id: String,
    pub s3_prefix: String,
    pub diagram_description: String,
    pub components: Vec<ComponentInput>,
    pub threat_types: Vec<ThreatType>,
}

/// Input for the `createComponent` mutation. The service assigns the
/// component id; `id` carries the diagram id, matching the wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentInput {
    pub id: String,
    pub diagram_id: String,
    pub name: String,
    pub description: String,
    pub component_type: ComponentType,
}

/// Input for the `updateComponent` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponentInput {
    pub id: String,
    pub diagram_id: String,
    pub component_id: String,
    pub name: String,
    pub description: String,
    pub component_type: ComponentType,
}

/// Input for the `updateThreat` mutation. Optional fields are omitted
/// from the wire payload when unset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThreatInput {
    pub id: String,
    pub diagram_id: String,
    pub component_id: String,
    pub threat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_type: Option<ThreatType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dread_scores: Option<DreadScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ThreatAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of a delete mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteItemResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of the `generateReport` mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub presigned_url: String,
}

/// ThreatModelApi port for the managed GraphQL service.
///
/// All real computation (diagram description, component extraction,
/// threat generation and scoring, report rendering) happens behind this
/// seam; the client only issues typed requests and decodes typed
/// responses. Long-running jobs additionally push results through the
/// [`DiagramEvents`](super::DiagramEvents) port.
#[async_trait]
pub trait ThreatModelApi: Send + Sync {
    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>>;

    /// Full diagram graph: components with nested threats. Returns
    /// `None` when the service has no diagram for the id.
    async fn get_diagram(&self, id: &str) -> Result<Option<Diagram>>;

    /// Kicks off description generation. The generated narrative arrives
    /// through the `createdDiagramDescription` subscription, not in this
    /// mutation's response.
    async fn create_diagram_description(&self, input: CreateDiagramInput) -> Result<()>;

    /// Kicks off component extraction; results arrive through the
    /// `extractedComponents` subscription.
    async fn extract_components(&self, input: ExtractComponentsInput) -> Result<()>;

    /// Kicks off threat generation; per-component batches arrive through
    /// the `generatedThreats` subscription and completion through
    /// `generatedAllThreats`.
    async fn generate_threats(&self, input: GenerateThreatsInput) -> Result<()>;

    async fn create_component(&self, input: CreateComponentInput) -> Result<Component>;

    async fn update_component(&self, input: UpdateComponentInput) -> Result<Component>;

    async fn delete_component(&self, component_id: &str) -> Result<DeleteItemResponse>;

    async fn update_threat(&self, input: UpdateThreatInput) -> Result<Threat>;

    async fn delete_threat(&self, threat_id: &str) -> Result<DeleteItemResponse>;

    async fn generate_report(&self, threat_model_id: &str) -> Result<Report>;
}
