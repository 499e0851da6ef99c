/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (the threat-modelling service,
/// object storage, console, etc.).
pub mod diagram_events;
pub mod object_store;
pub mod progress_reporter;
pub mod threat_model_api;

pub use diagram_events::{DiagramDelta, DiagramEvents, DiagramRef, EventSubscription};
pub use object_store::{ObjectStore, ProgressFn, DEFAULT_PRESIGN_EXPIRY};
pub use progress_reporter::ProgressReporter;
pub use threat_model_api::{
    ComponentInput, CreateComponentInput, CreateDiagramInput, DeleteItemResponse,
    ExtractComponentsInput, GenerateThreatsInput, Report, ThreatInput, ThreatModelApi,
    UpdateComponentInput, UpdateThreatInput,
};
