pub mod reconciler;
pub mod state;


use crate::application::dto::{CreateDiagramRequest, DiagramReport};
use crate::ports::outbound::{
    CreateComponentInput, CreateDiagramInput, DiagramEvents, ExtractComponentsInput,
    GenerateThreatsInput, ObjectStore, ProgressFn, ProgressReporter, ThreatModelApi,
    UpdateComponentInput, UpdateThreatInput,
};
use crate::shared::{Result, WorkflowError};
use crate::threat_model::domain::{
    Component, ComponentThreatAction, ComponentType, Diagram, DiagramStatus, DreadScores,
    FlattenedThreat, ThreatAction, ThreatActionCache, ThreatType,
};
use crate::threat_model::services::{BulkSelection, GenerationSwitches, ThreatFilter};
use reconciler::{DescriptionJob, ExtractionJob, GenerationEvent, GenerationJob};
use serde::Deserialize;
use state::DiagramState;
use std::time::Duration;
use uuid::Uuid;

/// What to do when a mutation the service rejected (or the network
/// dropped) would otherwise be swallowed: `LogOnly` reports it through
/// the diagnostic channel and carries on, `Surface` propagates it to
/// the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationFailurePolicy {
    #[default]
    LogOnly,
    Surface,
}

/// Pending reason dialog for one threat disposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatActionDialog {
    pub component_id: String,
    pub threat_id: String,
    pub action: ThreatAction,
    pub prompt: &'static str,
    /// Set iff the cache holds this threat's last submission AND its
    /// action equals the one being opened.
    pub prefilled_reason: Option<String>,
}

/// DiagramWorkflow - the stateful facade over one diagram's lifecycle
///
/// Owns the local diagram state, the filter/selection layer, the
/// ephemeral action cache, and the subscription-backed jobs that keep
/// the state in step with the service's asynchronous pipeline
/// (description, extraction, threat generation).
///
/// # Type Parameters
/// * `A` - ThreatModelApi implementation (queries and mutations)
/// * `E` - DiagramEvents implementation (subscription channels)
/// * `S` - ObjectStore implementation (diagram images, report download)
/// * `P` - ProgressReporter implementation
pub struct DiagramWorkflow<A, E, S, P> {
    api: A,
    events: E,
    object_store: S,
    progress_reporter: P,
    failure_policy: MutationFailurePolicy,
    state: Option<DiagramState>,
    filter: ThreatFilter,
    bulk: BulkSelection,
    switches: GenerationSwitches,
    action_cache: ThreatActionCache,
    description_sent: bool,
}

impl<A, E, S, P> DiagramWorkflow<A, E, S, P>
where
    A: ThreatModelApi,
    E: DiagramEvents,
    S: ObjectStore,
    P: ProgressReporter,
{
    pub fn new(
        api: A,
        events: E,
        object_store: S,
        progress_reporter: P,
        failure_policy: MutationFailurePolicy,
    ) -> Self {
        Self {
            api,
            events,
            object_store,
            progress_reporter,
            failure_policy,
            state: None,
            filter: ThreatFilter::new(),
            bulk: BulkSelection::new(),
            switches: GenerationSwitches::new(),
            action_cache: ThreatActionCache::new(),
            description_sent: false,
        }
    }

    /// The loaded diagram state, if any.
    pub fn current(&self) -> Option<&DiagramState> {
        self.state.as_ref()
    }

    pub fn description_sent(&self) -> bool {
        self.description_sent
    }

    fn state(&self) -> Result<&DiagramState> {
        self.state.as_ref().ok_or_else(|| {
            WorkflowError::Validation {
                message: "no diagram loaded; load or create one first".to_string(),
            }
            .into()
        })
    }

    fn state_mut(&mut self) -> Result<&mut DiagramState> {
        self.state.as_mut().ok_or_else(|| {
            WorkflowError::Validation {
                message: "no diagram loaded; load or create one first".to_string(),
            }
            .into()
        })
    }

    /// Reports a failed mutation through the diagnostic channel or
    /// propagates it, depending on the configured policy.
    fn mutation_failed(&self, operation: &'static str, details: String) -> Result<()> {
        let error = WorkflowError::MutationError { operation, details };
        match self.failure_policy {
            MutationFailurePolicy::LogOnly => {
                self.progress_reporter.report_error(&error.to_string());
                Ok(())
            }
            MutationFailurePolicy::Surface => Err(error.into()),
        }
    }

    /// Fetches a diagram and replaces all local state with it. Filters
    /// and bulk selection reset; the action cache survives reloads so
    /// dialog pre-fill keeps working across them.
    pub async fn load(&mut self, diagram_id: &str) -> Result<()> {
        let diagram = self
            .api
            .get_diagram(diagram_id)
            .await
            .map_err(|error| WorkflowError::LoadError {
                diagram_id: diagram_id.to_string(),
                details: error.to_string(),
            })?
            .ok_or_else(|| WorkflowError::LoadError {
                diagram_id: diagram_id.to_string(),
                details: "no diagram returned for id".to_string(),
            })?;
        self.state = Some(DiagramState::from_diagram(diagram));
        self.filter.clear();
        self.bulk.exit();
        Ok(())
    }

    /// Uploads the diagram image and kicks off description generation.
    ///
    /// The diagram id is generated client-side so the
    /// `createdDiagramDescription` channel can be opened for it BEFORE
    /// the mutation fires; pushing starts as soon as the service picks
    /// the job up, and nothing is lost to a late subscribe. On mutation
    /// failure the in-flight flag resets and the already-open
    /// subscription is dropped, which tears the channel down.
    pub async fn begin_create_diagram(
        &mut self,
        request: CreateDiagramRequest,
        image_bytes: Vec<u8>,
        on_progress: ProgressFn,
    ) -> Result<DescriptionJob> {
        let id = Uuid::new_v4().to_string();
        let filename = request
            .image_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| WorkflowError::Validation {
                message: format!(
                    "'{}' has no usable file name",
                    request.image_path.display()
                ),
            })?;
        let upload_path = format!("uploads/{}/{}", id, filename);

        let stored_path = self
            .object_store
            .upload(&upload_path, image_bytes, on_progress)
            .await
            .map_err(|error| WorkflowError::UploadError {
                path: upload_path.clone(),
                details: error.to_string(),
            })?;
        self.progress_reporter
            .report(&format!("📤 Uploaded diagram to {}", stored_path));

        let subscription = self.events.created_diagram_description(&id).await?;

        self.description_sent = true;
        if let Err(error) = self
            .api
            .create_diagram_description(CreateDiagramInput {
                id: id.clone(),
                s3_prefix: stored_path.clone(),
                user_description: request.user_description.clone(),
            })
            .await
        {
            self.description_sent = false;
            drop(subscription);
            return Err(error);
        }

        self.state = Some(DiagramState::from_diagram(Diagram {
            id: id.clone(),
            s3_prefix: stored_path,
            user_description: request.user_description,
            diagram_description: None,
            status: Some(DiagramStatus::NotStarted),
            components: Vec::new(),
        }));
        Ok(DescriptionJob::new(id, subscription))
    }

    /// Records the generated description once its job completes.
    pub fn apply_description(&mut self, description: String) -> Result<()> {
        self.state_mut()?.set_description(description);
        self.description_sent = false;
        Ok(())
    }

    /// Records a failed description job: the channel is torn down and
    /// the upload-in-progress flag cleared so a retry can start cleanly.
    pub fn description_failed(&mut self, job: &mut DescriptionJob, details: &str) {
        self.progress_reporter.report_error(&format!(
            "Description for diagram '{}' failed: {}",
            job.diagram_id(),
            details
        ));
        job.abandon();
        self.description_sent = false;
    }

    /// True when components already exist, so another extraction would
    /// append duplicates and needs the user to say so.
    pub fn requires_reextract_confirmation(&self) -> Result<bool> {
        Ok(!self.state()?.components().is_empty())
    }

    /// Kicks off component extraction. Returns `None` without touching
    /// the service when confirmation is required but not given.
    pub async fn begin_extraction(&mut self, confirmed: bool) -> Result<Option<ExtractionJob>> {
        if self.requires_reextract_confirmation()? && !confirmed {
            return Ok(None);
        }
        let (id, s3_prefix, diagram_description) = {
            let diagram = self.state()?.diagram();
            let description =
                diagram
                    .diagram_description
                    .clone()
                    .ok_or_else(|| WorkflowError::Validation {
                        message: "diagram has no description yet; wait for creation to finish"
                            .to_string(),
                    })?;
            (diagram.id.clone(), diagram.s3_prefix.clone(), description)
        };

        let subscription = self.events.extracted_components(&id).await?;
        self.api
            .extract_components(ExtractComponentsInput {
                id: id.clone(),
                s3_prefix,
                diagram_description,
            })
            .await?;
        Ok(Some(ExtractionJob::new(id, subscription)))
    }

    /// Merges an extraction result. Appends rather than replaces, so a
    /// confirmed re-extraction can produce duplicate components.
    pub fn apply_extracted_components(&mut self, components: Vec<Component>) -> Result<()> {
        self.progress_reporter
            .report(&format!("✅ Extracted {} component(s)", components.len()));
        self.state_mut()?.append_components(components);
        Ok(())
    }

    /// Opens both generation channels, then fires the mutation. Filters
    /// and bulk selection reset so the new threats arrive into an
    /// unfiltered view. Threats already held are sent back with their
    /// dispositions stripped of reasons.
    pub async fn begin_threat_generation(&mut self) -> Result<GenerationJob> {
        let input = {
            let diagram = self.state()?.diagram();
            if diagram.components.is_empty() {
                return Err(WorkflowError::Validation {
                    message: "no components to generate threats for; run extraction first"
                        .to_string(),
                }
                .into());
            }
            let diagram_description = diagram
                .diagram_description
                .clone()
                .unwrap_or_default();
            GenerateThreatsInput {
                id: diagram.id.clone(),
                s3_prefix: diagram.s3_prefix.clone(),
                diagram_description,
                components: diagram.components.iter().map(Into::into).collect(),
                threat_types: self.switches.enabled().to_vec(),
            }
        };
        let id = input.id.clone();

        self.filter.clear();
        self.bulk.exit();

        // Both channels must be live before the job can start pushing.
        let deltas = self.events.generated_threats(&id).await?;
        let completion = self.events.generated_all_threats(&id).await?;
        self.api.generate_threats(input).await?;

        self.state_mut()?.set_status(DiagramStatus::GeneratingThreats);
        Ok(GenerationJob::new(id, deltas, completion))
    }

    /// Applies the next generation event. Returns `true` once the job
    /// completed and both channels are closed.
    pub async fn process_generation(&mut self, job: &mut GenerationJob) -> Result<bool> {
        match job.next_event().await? {
            GenerationEvent::Batch(delta) => {
                let state = self.state_mut()?;
                let mut batch_total = 0;
                for component in delta.components {
                    batch_total += component.threats.len();
                    state.append_threat_batch(&component.id, component.threats);
                }
                let held = state.flattened_threats().len();
                self.progress_reporter.report(&format!(
                    "🔎 Received {} threat(s), {} total",
                    batch_total, held
                ));
                Ok(false)
            }
            GenerationEvent::Completed => {
                self.state_mut()?.set_status(DiagramStatus::ThreatsGenerated);
                self.progress_reporter
                    .report_completion("✅ Threat generation complete");
                Ok(true)
            }
        }
    }

    /// Drives a generation job to completion.
    pub async fn run_generation(&mut self, mut job: GenerationJob) -> Result<()> {
        while !self.process_generation(&mut job).await? {}
        Ok(())
    }

    // --- component edits: save first, apply locally after confirmation ---

    pub async fn add_component(
        &mut self,
        name: String,
        description: String,
        component_type: ComponentType,
    ) -> Result<Component> {
        let diagram_id = self.state()?.diagram().id.clone();
        let created = self
            .api
            .create_component(CreateComponentInput {
                id: diagram_id.clone(),
                diagram_id,
                name,
                description,
                component_type,
            })
            .await?;
        self.state_mut()?.add_component(created.clone());
        Ok(created)
    }

    pub async fn update_component(
        &mut self,
        component_id: &str,
        name: String,
        description: String,
        component_type: ComponentType,
    ) -> Result<()> {
        let diagram_id = self.state()?.diagram().id.clone();
        let updated = self
            .api
            .update_component(UpdateComponentInput {
                id: diagram_id.clone(),
                diagram_id,
                component_id: component_id.to_string(),
                name,
                description,
                component_type,
            })
            .await?;
        self.state_mut()?.update_component(updated);
        Ok(())
    }

    /// Deletes one component. Never speculative: the local copy only
    /// goes away once the service confirms.
    pub async fn delete_component(&mut self, component_id: &str) -> Result<bool> {
        let response = self.api.delete_component(component_id).await?;
        if response.success {
            self.state_mut()?.remove_component(component_id);
            if self.filter.component_id() == Some(component_id) {
                self.filter.set_component(None);
            }
            Ok(true)
        } else {
            let details = response
                .message
                .unwrap_or_else(|| "service reported failure".to_string());
            self.mutation_failed("deleteComponent", details)?;
            Ok(false)
        }
    }

    // --- filter / selection layer ---

    pub fn filter(&self) -> &ThreatFilter {
        &self.filter
    }

    pub fn toggle_component_filter(&mut self, component_id: &str) {
        self.filter.toggle_component(component_id);
    }

    pub fn set_threat_type_filter(&mut self, threat_type: Option<ThreatType>) {
        self.filter.set_threat_type(threat_type);
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    /// The flattened threat list with both filters applied, in
    /// accumulation order.
    pub fn filtered_threats(&self) -> Result<Vec<&FlattenedThreat>> {
        Ok(self.filter.apply(self.state()?.flattened_threats()))
    }

    // --- generation switches ---

    pub fn generation_switches(&self) -> &GenerationSwitches {
        &self.switches
    }

    pub fn toggle_generation_type(&mut self, threat_type: ThreatType) {
        self.switches.toggle(threat_type);
    }

    pub fn set_generation_types(&mut self, threat_types: &[ThreatType]) -> Result<()> {
        self.switches.enable_only(threat_types)
    }

    // --- bulk selection ---

    pub fn bulk_selection(&self) -> &BulkSelection {
        &self.bulk
    }

    pub fn toggle_bulk_mode(&mut self) {
        self.bulk.toggle_mode();
    }

    /// Selects or deselects a component for bulk delete. Components
    /// that still have threats are not selectable; the attempt is a
    /// no-op rather than an error.
    pub fn toggle_bulk_selection(&mut self, component_id: &str) -> Result<()> {
        let state = self.state()?;
        if state.component(component_id).is_none() {
            return Ok(());
        }
        let threat_count = state.threat_count_for(component_id);
        self.bulk.toggle(component_id, threat_count);
        Ok(())
    }

    /// Deletes every selected component, one mutation per id. Per-id
    /// failures are reported through the diagnostic channel and the
    /// component is removed locally regardless, matching the selection
    /// the user confirmed. Returns the ids that were processed; calling
    /// again with nothing selected does nothing.
    pub async fn confirm_bulk_delete(&mut self) -> Result<Vec<String>> {
        let selected = self.bulk.take_selected();
        self.bulk.exit();
        for component_id in &selected {
            match self.api.delete_component(component_id).await {
                Ok(response) if response.success => {}
                Ok(response) => {
                    self.progress_reporter.report_error(&format!(
                        "Failed to delete component '{}': {}",
                        component_id,
                        response
                            .message
                            .unwrap_or_else(|| "service reported failure".to_string())
                    ));
                }
                Err(error) => {
                    self.progress_reporter.report_error(&format!(
                        "Failed to delete component '{}': {}",
                        component_id, error
                    ));
                }
            }
            if let Some(state) = self.state.as_mut() {
                state.remove_component(component_id);
            }
            if self.filter.component_id() == Some(component_id.as_str()) {
                self.filter.set_component(None);
            }
        }
        Ok(selected)
    }

    // --- threat action workflow ---

    /// Opens the reason dialog for one disposition.
    pub fn open_threat_action(
        &self,
        component_id: &str,
        threat_id: &str,
        action: ThreatAction,
    ) -> Result<ThreatActionDialog> {
        let state = self.state()?;
        if state.threat(component_id, threat_id).is_none() {
            return Err(WorkflowError::Validation {
                message: format!(
                    "no threat '{}' on component '{}'",
                    threat_id, component_id
                ),
            }
            .into());
        }
        Ok(ThreatActionDialog {
            component_id: component_id.to_string(),
            threat_id: threat_id.to_string(),
            action,
            prompt: action.reason_prompt(),
            prefilled_reason: self
                .action_cache
                .prefill_reason(component_id, threat_id, action)
                .map(str::to_string),
        })
    }

    /// Switches an open dialog to another action, re-running the
    /// pre-fill rule for the new action.
    pub fn change_action(
        &self,
        dialog: &ThreatActionDialog,
        action: ThreatAction,
    ) -> ThreatActionDialog {
        ThreatActionDialog {
            component_id: dialog.component_id.clone(),
            threat_id: dialog.threat_id.clone(),
            action,
            prompt: action.reason_prompt(),
            prefilled_reason: self
                .action_cache
                .prefill_reason(&dialog.component_id, &dialog.threat_id, action)
                .map(str::to_string),
        }
    }

    /// Submits the disposition. Local state and the reason cache only
    /// advance once the service accepts the mutation; on failure the
    /// configured policy decides whether the error surfaces, and the
    /// threat keeps its previous disposition either way.
    pub async fn submit_threat_action(
        &mut self,
        dialog: &ThreatActionDialog,
        reason: String,
    ) -> Result<()> {
        let diagram_id = self.state()?.diagram().id.clone();
        let result = self
            .api
            .update_threat(UpdateThreatInput {
                id: diagram_id.clone(),
                diagram_id,
                component_id: dialog.component_id.clone(),
                threat_id: dialog.threat_id.clone(),
                name: None,
                description: None,
                threat_type: None,
                dread_scores: None,
                action: Some(dialog.action),
                reason: Some(reason.clone()),
            })
            .await;
        if let Err(error) = result {
            return self.mutation_failed("updateThreat", error.to_string());
        }

        self.state_mut()?.update_threat_action(
            &dialog.component_id,
            &dialog.threat_id,
            dialog.action,
            reason.clone(),
        );
        self.action_cache.upsert(ComponentThreatAction {
            component_id: dialog.component_id.clone(),
            threat_id: dialog.threat_id.clone(),
            action: dialog.action,
            reason,
        });
        Ok(())
    }

    /// Edits a threat's descriptive fields; the service's version of
    /// the threat is what lands in local state.
    pub async fn update_threat_details(
        &mut self,
        component_id: &str,
        threat_id: &str,
        name: Option<String>,
        description: Option<String>,
        threat_type: Option<ThreatType>,
        dread_scores: Option<DreadScores>,
    ) -> Result<()> {
        let diagram_id = self.state()?.diagram().id.clone();
        let result = self
            .api
            .update_threat(UpdateThreatInput {
                id: diagram_id.clone(),
                diagram_id,
                component_id: component_id.to_string(),
                threat_id: threat_id.to_string(),
                name,
                description,
                threat_type,
                dread_scores,
                action: None,
                reason: None,
            })
            .await;
        match result {
            Ok(updated) => {
                self.state_mut()?.update_threat(component_id, updated);
                Ok(())
            }
            Err(error) => self.mutation_failed("updateThreat", error.to_string()),
        }
    }

    /// Deletes one threat, locally only after the service confirms.
    pub async fn delete_threat(&mut self, component_id: &str, threat_id: &str) -> Result<bool> {
        let response = self.api.delete_threat(threat_id).await?;
        if response.success {
            self.state_mut()?.remove_threat(component_id, threat_id);
            Ok(true)
        } else {
            let details = response
                .message
                .unwrap_or_else(|| "service reported failure".to_string());
            self.mutation_failed("deleteThreat", details)?;
            Ok(false)
        }
    }

    // --- report export ---

    /// Asks the service to render the report and returns the presigned
    /// link plus a suggested local filename.
    pub async fn generate_report(&self) -> Result<DiagramReport> {
        let diagram_id = self.state()?.diagram().id.clone();
        let report = self.api.generate_report(&diagram_id).await?;
        Ok(DiagramReport::new(diagram_id, report.presigned_url))
    }

    /// Fetches the report body behind a presigned URL.
    pub async fn download_report(&self, report: &DiagramReport) -> Result<Vec<u8>> {
        self.object_store.download(&report.presigned_url).await
    }

    /// Short-lived read link for the uploaded diagram image.
    pub async fn diagram_image_url(&self, expires_in: Duration) -> Result<String> {
        let path = self.state()?.diagram().s3_prefix.clone();
        self.object_store.presigned_url(&path, expires_in).await
    }
}
