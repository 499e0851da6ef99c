use super::threat::ThreatAction;

/// Client-only record of the disposition most recently submitted for a
/// threat, kept separately from the authoritative `Threat.action` field
/// so the dialog can pre-fill instantly without a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentThreatAction {
    pub component_id: String,
    pub threat_id: String,
    pub action: ThreatAction,
    pub reason: String,
}

/// Ephemeral cache of submitted threat actions, at most one entry per
/// threat id.
#[derive(Debug, Default)]
pub struct ThreatActionCache {
    entries: Vec<ComponentThreatAction>,
}

impl ThreatActionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any prior entry for the same threat id, then appends.
    pub fn upsert(&mut self, entry: ComponentThreatAction) {
        self.entries.retain(|e| e.threat_id != entry.threat_id);
        self.entries.push(entry);
    }

    pub fn entry_for(&self, component_id: &str, threat_id: &str) -> Option<&ComponentThreatAction> {
        self.entries
            .iter()
            .find(|e| e.component_id == component_id && e.threat_id == threat_id)
    }

    pub fn entry_for_threat(&self, threat_id: &str) -> Option<&ComponentThreatAction> {
        self.entries.iter().find(|e| e.threat_id == threat_id)
    }

    /// The dialog pre-fill rule: return the cached reason iff a cached
    /// entry exists for this threat AND its action matches the action
    /// being opened. Any other combination starts with an empty reason.
    pub fn prefill_reason(
        &self,
        component_id: &str,
        threat_id: &str,
        action: ThreatAction,
    ) -> Option<&str> {
        self.entry_for(component_id, threat_id)
            .filter(|e| e.action == action)
            .map(|e| e.reason.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
