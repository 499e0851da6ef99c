use super::threat::Threat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of system elements the extractor identifies in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    Process,
    DataStore,
    DataFlow,
    Actor,
    TrustBoundary,
    ExternalEntity,
}

impl ComponentType {
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Process,
        ComponentType::DataStore,
        ComponentType::DataFlow,
        ComponentType::Actor,
        ComponentType::TrustBoundary,
        ComponentType::ExternalEntity,
    ];

    /// Fixed priority used when sorting the component grid:
    /// Actor, ExternalEntity, DataStore, Process, DataFlow, TrustBoundary.
    pub fn display_priority(self) -> usize {
        match self {
            ComponentType::Actor => 0,
            ComponentType::ExternalEntity => 1,
            ComponentType::DataStore => 2,
            ComponentType::Process => 3,
            ComponentType::DataFlow => 4,
            ComponentType::TrustBoundary => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Process => "Process",
            ComponentType::DataStore => "DataStore",
            ComponentType::DataFlow => "DataFlow",
            ComponentType::Actor => "Actor",
            ComponentType::TrustBoundary => "TrustBoundary",
            ComponentType::ExternalEntity => "ExternalEntity",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(ComponentType::Process),
            "datastore" | "data-store" => Ok(ComponentType::DataStore),
            "dataflow" | "data-flow" => Ok(ComponentType::DataFlow),
            "actor" => Ok(ComponentType::Actor),
            "trustboundary" | "trust-boundary" => Ok(ComponentType::TrustBoundary),
            "externalentity" | "external-entity" => Ok(ComponentType::ExternalEntity),
            _ => Err(format!(
                "Invalid component type: {}. Expected one of: Process, DataStore, DataFlow, Actor, TrustBoundary, ExternalEntity",
                s
            )),
        }
    }
}

/// A system element identified in the diagram, owning its threats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub component_type: ComponentType,
    #[serde(default, deserialize_with = "super::null_to_default")]
    pub threats: Vec<Threat>,
}

impl Component {
    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }
}

/// Sorts components for display: fixed type priority, ties broken by name.
pub fn sort_for_display(components: &mut [Component]) {
    components.sort_by(|a, b| {
        a.component_type
            .display_priority()
            .cmp(&b.component_type.display_priority())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str, name: &str, component_type: ComponentType) -> Component {
        Component {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            component_type,
            threats: Vec::new(),
        }
    }

    #[test]
    fn test_sort_for_display_by_type_priority() {
        let mut components = vec![
            component("c1", "Queue", ComponentType::TrustBoundary),
            component("c2", "API", ComponentType::Process),
            component("c3", "User", ComponentType::Actor),
            component("c4", "Ledger", ComponentType::DataStore),
        ];
        sort_for_display(&mut components);
        let order: Vec<&str> = components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["c3", "c4", "c2", "c1"]);
    }

    #[test]
    fn test_sort_for_display_ties_broken_by_name() {
        let mut components = vec![
            component("c1", "Zeta", ComponentType::Actor),
            component("c2", "Alpha", ComponentType::Actor),
        ];
        sort_for_display(&mut components);
        assert_eq!(components[0].name, "Alpha");
        assert_eq!(components[1].name, "Zeta");
    }

    #[test]
    fn test_component_decodes_with_null_threats() {
        let json = r#"{
            "id": "C1",
            "name": "Payment service",
            "description": "Handles card payments",
            "componentType": "Process",
            "threats": null,
            "__typename": "Component"
        }"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(component.component_type, ComponentType::Process);
        assert!(component.threats.is_empty());
    }

    #[test]
    fn test_component_type_from_str() {
        assert_eq!(
            "trust-boundary".parse::<ComponentType>().unwrap(),
            ComponentType::TrustBoundary
        );
        assert!("widget".parse::<ComponentType>().is_err());
    }
}
