pub mod diagram_workflow;
pub mod list_diagrams;

pub use diagram_workflow::{DiagramWorkflow, MutationFailurePolicy, ThreatActionDialog};
pub use list_diagrams::ListDiagramsUseCase;
