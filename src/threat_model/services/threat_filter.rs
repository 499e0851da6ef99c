use crate::threat_model::domain::{FlattenedThreat, ThreatType};

/// Single-select filters over the flattened threat list: one optional
/// component filter and one optional threat-type filter, composed with
/// AND. Accumulation order of the underlying list is preserved.
#[derive(Debug, Default, Clone)]
pub struct ThreatFilter {
    component_id: Option<String>,
    threat_type: Option<ThreatType>,
}

impl ThreatFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clicking a component toggles its filter; selecting the already
    /// selected component clears it.
    pub fn toggle_component(&mut self, component_id: &str) {
        if self.component_id.as_deref() == Some(component_id) {
            self.component_id = None;
        } else {
            self.component_id = Some(component_id.to_string());
        }
    }

    pub fn set_component(&mut self, component_id: Option<String>) {
        self.component_id = component_id;
    }

    pub fn set_threat_type(&mut self, threat_type: Option<ThreatType>) {
        self.threat_type = threat_type;
    }

    pub fn clear(&mut self) {
        self.component_id = None;
        self.threat_type = None;
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    pub fn threat_type(&self) -> Option<ThreatType> {
        self.threat_type
    }

    pub fn is_active(&self) -> bool {
        self.component_id.is_some() || self.threat_type.is_some()
    }

    /// Threats where (no component filter OR matching component) AND
    /// (no type filter OR matching type).
    pub fn apply<'a>(&self, threats: &'a [FlattenedThreat]) -> Vec<&'a FlattenedThreat> {
        threats
            .iter()
            .filter(|t| {
                let component_match = self
                    .component_id
                    .as_deref()
                    .is_none_or(|id| t.component_id == id);
                let type_match = self
                    .threat_type
                    .is_none_or(|ty| t.threat.threat_type == ty);
                component_match && type_match
            })
            .collect()
    }
}
