use crate::ports::outbound::{
    CreateComponentInput, CreateDiagramInput, DeleteItemResponse, ExtractComponentsInput,
    GenerateThreatsInput, Report, ThreatModelApi, UpdateComponentInput, UpdateThreatInput,
};
use crate::shared::Result;
use crate::threat_model::domain::{Component, Diagram, DiagramSummary, Threat};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const LIST_DIAGRAMS: &str = "query listDiagrams { listDiagrams { id s3Prefix status diagramDescription userDescription } }";

const GET_DIAGRAM: &str = "query getDiagram($id: ID!) { getDiagram(id: $id) { id s3Prefix userDescription diagramDescription status components { id name description componentType threats { id name description threatType dreadScores { damage reproducibility exploitability affectedUsers discoverability } action reason } } } }";

const CREATE_DIAGRAM_DESCRIPTION: &str = "mutation createDiagramDescription($diagramInput: CreateDiagramInput!) { createDiagramDescription(diagramInput: $diagramInput) { id } }";

const EXTRACT_COMPONENTS: &str = "mutation extractComponents($extractComponentsInput: ExtractComponentsInput!) { extractComponents(extractComponentsInput: $extractComponentsInput) { id } }";

const GENERATE_THREATS: &str = "mutation generateThreats($generateThreatsInput: GenerateThreatsInput!) { generateThreats(generateThreatsInput: $generateThreatsInput) { id } }";

const CREATE_COMPONENT: &str = "mutation createComponent($createComponentInput: CreateComponentInput!) { createComponent(createComponentInput: $createComponentInput) { id name description componentType } }";

const UPDATE_COMPONENT: &str = "mutation updateComponent($updateComponentInput: UpdateComponentInput!) { updateComponent(updateComponentInput: $updateComponentInput) { id name description componentType } }";

const UPDATE_THREAT: &str = "mutation updateThreat($updateThreatInput: UpdateThreatInput!) { updateThreat(updateThreatInput: $updateThreatInput) { id name description threatType dreadScores { damage reproducibility exploitability affectedUsers discoverability } action reason } }";

const DELETE_COMPONENT: &str = "mutation deleteComponent($componentId: ID!) { deleteComponent(componentId: $componentId) { success message } }";

const DELETE_THREAT: &str = "mutation deleteThreat($threatId: ID!) { deleteThreat(threatId: $threatId) { success message } }";

const GENERATE_REPORT: &str = "mutation generateReport($threat_model_id: ID!) { generateReport(threat_model_id: $threat_model_id) { presignedUrl } }";

/// The one wire envelope every GraphQL response arrives in. Decoded
/// exactly once, here at the boundary; everything past this point works
/// with domain types.
#[derive(Debug, Deserialize)]
struct GraphQlEnvelope<T> {
    // a plain #[serde(default)] would put a `T: Default` bound on the
    // derived impl, which the payload types don't carry
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListDiagramsData {
    #[serde(rename = "listDiagrams")]
    list_diagrams: Vec<DiagramSummary>,
}

#[derive(Debug, Deserialize)]
struct GetDiagramData {
    #[serde(rename = "getDiagram")]
    get_diagram: Option<Diagram>,
}

#[derive(Debug, Deserialize)]
struct CreateComponentData {
    #[serde(rename = "createComponent")]
    create_component: Component,
}

#[derive(Debug, Deserialize)]
struct UpdateComponentData {
    #[serde(rename = "updateComponent")]
    update_component: Component,
}

#[derive(Debug, Deserialize)]
struct UpdateThreatData {
    #[serde(rename = "updateThreat")]
    update_threat: Threat,
}

#[derive(Debug, Deserialize)]
struct DeleteComponentData {
    #[serde(rename = "deleteComponent")]
    delete_component: DeleteItemResponse,
}

#[derive(Debug, Deserialize)]
struct DeleteThreatData {
    #[serde(rename = "deleteThreat")]
    delete_threat: DeleteItemResponse,
}

#[derive(Debug, Deserialize)]
struct GenerateReportData {
    #[serde(rename = "generateReport")]
    generate_report: Report,
}

/// GraphQlThreatModelApi adapter for the managed threat-modelling service
///
/// Implements the ThreatModelApi port over GraphQL-over-HTTP using an
/// async reqwest client. Read queries retry with backoff; mutations are
/// sent exactly once so a slow job kick is never duplicated.
pub struct GraphQlThreatModelApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl GraphQlThreatModelApi {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("threatflow/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            max_retries: 3,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": document, "variables": variables }));
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "threat model API returned status code {}",
                response.status()
            );
        }

        let envelope: GraphQlEnvelope<T> = response.json().await?;
        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect();
            anyhow::bail!("GraphQL errors: {}", messages.join("; "));
        }
        envelope
            .data
            .ok_or_else(|| anyhow::anyhow!("GraphQL response carried neither data nor errors"))
    }

    /// Read query with retry. Mutations never come through here.
    async fn query_with_retry<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.execute(document, variables.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("query failed with no attempts made")))
    }
}

#[async_trait]
impl ThreatModelApi for GraphQlThreatModelApi {
    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>> {
        let data: ListDiagramsData = self.query_with_retry(LIST_DIAGRAMS, json!({})).await?;
        Ok(data.list_diagrams)
    }

    async fn get_diagram(&self, id: &str) -> Result<Option<Diagram>> {
        let data: GetDiagramData = self
            .query_with_retry(GET_DIAGRAM, json!({ "id": id }))
            .await?;
        Ok(data.get_diagram)
    }

    async fn create_diagram_description(&self, input: CreateDiagramInput) -> Result<()> {
        self.execute::<serde_json::Value>(CREATE_DIAGRAM_DESCRIPTION, json!({ "diagramInput": input }))
            .await?;
        Ok(())
    }

    async fn extract_components(&self, input: ExtractComponentsInput) -> Result<()> {
        self.execute::<serde_json::Value>(EXTRACT_COMPONENTS, json!({ "extractComponentsInput": input }))
            .await?;
        Ok(())
    }

    async fn generate_threats(&self, input: GenerateThreatsInput) -> Result<()> {
        self.execute::<serde_json::Value>(GENERATE_THREATS, json!({ "generateThreatsInput": input }))
            .await?;
        Ok(())
    }

    async fn create_component(&self, input: CreateComponentInput) -> Result<Component> {
        let data: CreateComponentData = self
            .execute(CREATE_COMPONENT, json!({ "createComponentInput": input }))
            .await?;
        Ok(data.create_component)
    }

    async fn update_component(&self, input: UpdateComponentInput) -> Result<Component> {
        let data: UpdateComponentData = self
            .execute(UPDATE_COMPONENT, json!({ "updateComponentInput": input }))
            .await?;
        Ok(data.update_component)
    }

    async fn delete_component(&self, component_id: &str) -> Result<DeleteItemResponse> {
        let data: DeleteComponentData = self
            .execute(DELETE_COMPONENT, json!({ "componentId": component_id }))
            .await?;
        Ok(data.delete_component)
    }

    async fn update_threat(&self, input: UpdateThreatInput) -> Result<Threat> {
        let data: UpdateThreatData = self
            .execute(UPDATE_THREAT, json!({ "updateThreatInput": input }))
            .await?;
        Ok(data.update_threat)
    }

    async fn delete_threat(&self, threat_id: &str) -> Result<DeleteItemResponse> {
        let data: DeleteThreatData = self
            .execute(DELETE_THREAT, json!({ "threatId": threat_id }))
            .await?;
        Ok(data.delete_threat)
    }

    async fn generate_report(&self, threat_model_id: &str) -> Result<Report> {
        let data: GenerateReportData = self
            .execute(GENERATE_REPORT, json!({ "threat_model_id": threat_model_id }))
            .await?;
        Ok(data.generate_report)
    }
}
