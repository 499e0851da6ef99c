use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use threatflow::ports::outbound::{
    CreateComponentInput, CreateDiagramInput, DeleteItemResponse, ExtractComponentsInput,
    GenerateThreatsInput, Report, ThreatModelApi, UpdateComponentInput, UpdateThreatInput,
};
use threatflow::shared::Result;
use threatflow::threat_model::domain::{Component, Diagram, DiagramSummary, Threat};

/// Mock ThreatModelApi serving one scripted diagram and recording the
/// operations it receives.
#[derive(Default, Clone)]
pub struct MockThreatModelApi {
    diagram: Arc<Mutex<Option<Diagram>>>,
    operations: Arc<Mutex<Vec<String>>>,
}

impl MockThreatModelApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagram(self, diagram: Diagram) -> Self {
        *self.diagram.lock().unwrap() = Some(diagram);
        self
    }

    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    pub fn operation_count(&self, name: &str) -> usize {
        self.operations
            .lock()
            .unwrap()
            .iter()
            .filter(|op| op.as_str() == name)
            .count()
    }

    fn record(&self, name: &str) {
        self.operations.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ThreatModelApi for MockThreatModelApi {
    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>> {
        self.record("listDiagrams");
        Ok(self
            .diagram
            .lock()
            .unwrap()
            .iter()
            .map(|diagram| DiagramSummary {
                id: diagram.id.clone(),
                s3_prefix: diagram.s3_prefix.clone(),
                status: diagram.status,
                diagram_description: diagram.diagram_description.clone(),
                user_description: Some(diagram.user_description.clone()),
            })
            .collect())
    }

    async fn get_diagram(&self, id: &str) -> Result<Option<Diagram>> {
        self.record("getDiagram");
        Ok(self
            .diagram
            .lock()
            .unwrap()
            .clone()
            .filter(|diagram| diagram.id == id))
    }

    async fn create_diagram_description(&self, _input: CreateDiagramInput) -> Result<()> {
        self.record("createDiagramDescription");
        Ok(())
    }

    async fn extract_components(&self, _input: ExtractComponentsInput) -> Result<()> {
        self.record("extractComponents");
        Ok(())
    }

    async fn generate_threats(&self, _input: GenerateThreatsInput) -> Result<()> {
        self.record("generateThreats");
        Ok(())
    }

    async fn create_component(&self, input: CreateComponentInput) -> Result<Component> {
        self.record("createComponent");
        Ok(Component {
            id: format!("srv-{}", input.name.to_lowercase().replace(' ', "-")),
            name: input.name,
            description: input.description,
            component_type: input.component_type,
            threats: Vec::new(),
        })
    }

    async fn update_component(&self, input: UpdateComponentInput) -> Result<Component> {
        self.record("updateComponent");
        Ok(Component {
            id: input.component_id,
            name: input.name,
            description: input.description,
            component_type: input.component_type,
            threats: Vec::new(),
        })
    }

    async fn delete_component(&self, _component_id: &str) -> Result<DeleteItemResponse> {
        self.record("deleteComponent");
        Ok(DeleteItemResponse {
            success: true,
            message: None,
        })
    }

    async fn update_threat(&self, input: UpdateThreatInput) -> Result<Threat> {
        self.record("updateThreat");
        let stored = self
            .diagram
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|diagram| {
                diagram
                    .components
                    .iter()
                    .find(|c| c.id == input.component_id)
            })
            .and_then(|component| component.threats.iter().find(|t| t.id == input.threat_id))
            .cloned();

        let mut threat = stored.ok_or_else(|| {
            anyhow::anyhow!("no threat '{}' in the scripted diagram", input.threat_id)
        })?;
        if let Some(name) = input.name {
            threat.name = name;
        }
        if let Some(description) = input.description {
            threat.description = description;
        }
        if let Some(threat_type) = input.threat_type {
            threat.threat_type = threat_type;
        }
        if let Some(dread_scores) = input.dread_scores {
            threat.dread_scores = dread_scores;
        }
        if input.action.is_some() {
            threat.action = input.action;
        }
        if input.reason.is_some() {
            threat.reason = input.reason;
        }
        Ok(threat)
    }

    async fn delete_threat(&self, _threat_id: &str) -> Result<DeleteItemResponse> {
        self.record("deleteThreat");
        Ok(DeleteItemResponse {
            success: true,
            message: None,
        })
    }

    async fn generate_report(&self, threat_model_id: &str) -> Result<Report> {
        self.record("generateReport");
        Ok(Report {
            presigned_url: format!(
                "https://storage.example.com/reports/{}/report.pdf?sig=test",
                threat_model_id
            ),
        })
    }
}
