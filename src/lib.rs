//! threatflow - workflow client for a remote threat-modelling service
//!
//! This library drives the diagram lifecycle on a managed GraphQL API:
//! upload an architecture diagram, have its components extracted,
//! generate STRIDE threats with DREAD scores, record dispositions and
//! export a report. Long-running jobs push results over subscription
//! channels; the workflow keeps local state in step with them.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`threat_model`): diagrams, components, threats
//!   and the pure filter/selection services
//! - **Application Layer** (`application`): the `DiagramWorkflow` use
//!   case and DTOs
//! - **Ports** (`ports`): interface definitions for infrastructure
//! - **Adapters** (`adapters`): concrete implementations of ports
//! - **Shared** (`shared`): common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use threatflow::prelude::*;
//!
//! # async fn demo() -> Result<()> {
//! let api = GraphQlThreatModelApi::new(
//!     "https://api.example.com/graphql".to_string(),
//!     Some("key".to_string()),
//! )?;
//! let events = SseDiagramEvents::new(
//!     "https://api.example.com".to_string(),
//!     Some("key".to_string()),
//! )?;
//! let store = HttpObjectStore::new("https://storage.example.com".to_string(), None)?;
//! let reporter = StderrProgressReporter::new();
//!
//! let mut workflow =
//!     DiagramWorkflow::new(api, events, store, reporter, MutationFailurePolicy::LogOnly);
//! workflow.load("diagram-id").await?;
//! for component in workflow.current().unwrap().sorted_components() {
//!     println!("{} ({})", component.name, component.component_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod shared;
pub mod threat_model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::network::{GraphQlThreatModelApi, SseDiagramEvents};
    pub use crate::adapters::outbound::storage::{CachingObjectStore, HttpObjectStore};
    pub use crate::application::dto::{CreateDiagramRequest, DiagramReport};
    pub use crate::application::use_cases::{
        DiagramWorkflow, ListDiagramsUseCase, MutationFailurePolicy, ThreatActionDialog,
    };
    pub use crate::ports::outbound::{
        DiagramEvents, ObjectStore, ProgressReporter, ThreatModelApi,
    };
    pub use crate::threat_model::domain::{
        Component, ComponentType, Diagram, DiagramStatus, DiagramSummary, DreadScores, Threat,
        ThreatAction, ThreatType,
    };
    pub use crate::threat_model::policies::DreadBand;
    pub use crate::shared::Result;
}
