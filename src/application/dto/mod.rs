pub mod create_diagram_request;
pub mod diagram_report;

pub use create_diagram_request::CreateDiagramRequest;
pub use diagram_report::DiagramReport;
