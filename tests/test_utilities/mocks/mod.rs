/// Mock implementations for testing
mod mock_diagram_events;
mod mock_object_store;
mod mock_progress_reporter;
mod mock_threat_model_api;

pub use mock_diagram_events::MockDiagramEvents;
pub use mock_object_store::MockObjectStore;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_threat_model_api::MockThreatModelApi;
