use super::component::Component;
use super::threat::FlattenedThreat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage of a diagram, using the wire names of the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagramStatus {
    #[serde(rename = "NA")]
    NotStarted,
    #[serde(rename = "GENERATING_THREATS")]
    GeneratingThreats,
    #[serde(rename = "THREATS_GENERATED")]
    ThreatsGenerated,
}

impl fmt::Display for DiagramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramStatus::NotStarted => write!(f, "not started"),
            DiagramStatus::GeneratingThreats => write!(f, "generating threats"),
            DiagramStatus::ThreatsGenerated => write!(f, "threats generated"),
        }
    }
}

/// The top-level unit of work: one architecture diagram plus its
/// extracted components and generated threats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_to_default")]
    pub s3_prefix: String,
    /// Free text the user supplied at creation. Defaults to empty when
    /// the API returns null.
    #[serde(default, deserialize_with = "super::null_to_default")]
    pub user_description: String,
    #[serde(default)]
    pub diagram_description: Option<String>,
    #[serde(default)]
    pub status: Option<DiagramStatus>,
    #[serde(default, deserialize_with = "super::null_to_default")]
    pub components: Vec<Component>,
}

impl Diagram {
    /// Flattens `components[*].threats[*]` into a single list, each entry
    /// tagged with its owning component id.
    pub fn flatten_threats(&self) -> Vec<FlattenedThreat> {
        self.components
            .iter()
            .flat_map(|component| {
                component.threats.iter().map(|threat| FlattenedThreat {
                    component_id: component.id.clone(),
                    threat: threat.clone(),
                })
            })
            .collect()
    }
}

/// Row of the `listDiagrams` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_to_default")]
    pub s3_prefix: String,
    #[serde(default)]
    pub status: Option<DiagramStatus>,
    #[serde(default)]
    pub diagram_description: Option<String>,
    #[serde(default)]
    pub user_description: Option<String>,
}
