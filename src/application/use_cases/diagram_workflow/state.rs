use crate::threat_model::domain::{
    sort_for_display, Component, Diagram, DiagramStatus, FlattenedThreat, Threat, ThreatAction,
};

/// In-memory image of one diagram, kept in two shapes at once: the
/// nested component tree the API speaks, and the flattened threat list
/// the triage views read. Every mutation updates both, so the flattened
/// list always holds the same entries [`Diagram::flatten_threats`]
/// would produce from the tree. The flattened list keeps arrival
/// order, which is the order threats are shown in, so entries from a
/// late generation batch sit after everything already held.
#[derive(Debug, Clone)]
pub struct DiagramState {
    diagram: Diagram,
    flattened: Vec<FlattenedThreat>,
}

impl DiagramState {
    pub fn from_diagram(diagram: Diagram) -> Self {
        let flattened = diagram.flatten_threats();
        Self {
            diagram,
            flattened,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn components(&self) -> &[Component] {
        &self.diagram.components
    }

    /// Components in display order; the stored order is untouched.
    pub fn sorted_components(&self) -> Vec<Component> {
        let mut components = self.diagram.components.clone();
        sort_for_display(&mut components);
        components
    }

    pub fn flattened_threats(&self) -> &[FlattenedThreat] {
        &self.flattened
    }

    pub fn component(&self, component_id: &str) -> Option<&Component> {
        self.diagram
            .components
            .iter()
            .find(|c| c.id == component_id)
    }

    pub fn threat(&self, component_id: &str, threat_id: &str) -> Option<&Threat> {
        self.component(component_id)?
            .threats
            .iter()
            .find(|t| t.id == threat_id)
    }

    pub fn threat_count_for(&self, component_id: &str) -> usize {
        self.component(component_id)
            .map(Component::threat_count)
            .unwrap_or(0)
    }

    pub fn set_status(&mut self, status: DiagramStatus) {
        self.diagram.status = Some(status);
    }

    pub fn set_description(&mut self, description: String) {
        self.diagram.diagram_description = Some(description);
    }

    /// Applies a fresh snapshot from the service, rebuilding the
    /// flattened list from it.
    pub fn replace(&mut self, diagram: Diagram) {
        self.flattened = diagram.flatten_threats();
        self.diagram = diagram;
    }

    /// Extraction result: components are appended to whatever is held.
    /// Re-extraction therefore risks duplicates, which is why callers
    /// gate it behind an explicit confirmation.
    pub fn append_components(&mut self, components: Vec<Component>) {
        for component in components {
            self.add_component(component);
        }
    }

    pub fn add_component(&mut self, component: Component) {
        for threat in &component.threats {
            self.flattened.push(FlattenedThreat {
                component_id: component.id.clone(),
                threat: threat.clone(),
            });
        }
        self.diagram.components.push(component);
    }

    pub fn update_component(&mut self, updated: Component) {
        if let Some(existing) = self
            .diagram
            .components
            .iter_mut()
            .find(|c| c.id == updated.id)
        {
            existing.name = updated.name;
            existing.description = updated.description;
            existing.component_type = updated.component_type;
        }
    }

    /// Removes a component and every flattened threat it owned.
    pub fn remove_component(&mut self, component_id: &str) {
        self.diagram.components.retain(|c| c.id != component_id);
        self.flattened.retain(|f| f.component_id != component_id);
    }

    /// Merges a per-component generation batch: threats are appended to
    /// the owning component and to the flattened list, without any
    /// de-duplication against what is already held.
    pub fn append_threat_batch(&mut self, component_id: &str, threats: Vec<Threat>) {
        let Some(component) = self
            .diagram
            .components
            .iter_mut()
            .find(|c| c.id == component_id)
        else {
            return;
        };
        for threat in threats {
            self.flattened.push(FlattenedThreat {
                component_id: component_id.to_string(),
                threat: threat.clone(),
            });
            component.threats.push(threat);
        }
    }

    pub fn update_threat(&mut self, component_id: &str, updated: Threat) {
        if let Some(component) = self
            .diagram
            .components
            .iter_mut()
            .find(|c| c.id == component_id)
        {
            if let Some(threat) = component.threats.iter_mut().find(|t| t.id == updated.id) {
                *threat = updated.clone();
            }
        }
        if let Some(flat) = self
            .flattened
            .iter_mut()
            .find(|f| f.component_id == component_id && f.threat.id == updated.id)
        {
            flat.threat = updated;
        }
    }

    pub fn update_threat_action(
        &mut self,
        component_id: &str,
        threat_id: &str,
        action: ThreatAction,
        reason: String,
    ) {
        if let Some(component) = self
            .diagram
            .components
            .iter_mut()
            .find(|c| c.id == component_id)
        {
            if let Some(threat) = component.threats.iter_mut().find(|t| t.id == threat_id) {
                threat.action = Some(action);
                threat.reason = Some(reason.clone());
            }
        }
        if let Some(flat) = self
            .flattened
            .iter_mut()
            .find(|f| f.component_id == component_id && f.threat.id == threat_id)
        {
            flat.threat.action = Some(action);
            flat.threat.reason = Some(reason);
        }
    }

    pub fn remove_threat(&mut self, component_id: &str, threat_id: &str) {
        if let Some(component) = self
            .diagram
            .components
            .iter_mut()
            .find(|c| c.id == component_id)
        {
            component.threats.retain(|t| t.id != threat_id);
        }
        self.flattened
            .retain(|f| !(f.component_id == component_id && f.threat.id == threat_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threat_model::domain::{ComponentType, DreadScores, ThreatType};

    fn threat(id: &str) -> Threat {
        Threat {
            id: id.to_string(),
            name: format!("threat {}", id),
            description: String::new(),
            threat_type: ThreatType::Spoofing,
            dread_scores: DreadScores::new(5, 5, 5, 5, 5).unwrap(),
            action: None,
            reason: None,
        }
    }

    fn component(id: &str, threats: Vec<Threat>) -> Component {
        Component {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            component_type: ComponentType::Process,
            threats,
        }
    }

    fn state() -> DiagramState {
        DiagramState::from_diagram(Diagram {
            id: "D1".to_string(),
            s3_prefix: "uploads/D1".to_string(),
            user_description: String::new(),
            diagram_description: None,
            status: None,
            components: vec![
                component("C1", vec![threat("T1"), threat("T2")]),
                component("C2", vec![threat("T3")]),
            ],
        })
    }

    // Order-insensitive: the flattened list keeps arrival order, which
    // may interleave components differently than a tree walk.
    fn assert_flatten_invariant(state: &DiagramState) {
        let key = |f: &FlattenedThreat| (f.component_id.clone(), f.threat.id.clone());
        let mut held = state.flattened_threats().to_vec();
        held.sort_by_key(key);
        let mut rebuilt = state.diagram().flatten_threats();
        rebuilt.sort_by_key(key);
        assert_eq!(held, rebuilt);
    }

    #[test]
    fn test_append_threat_batch_updates_both_representations() {
        let mut state = state();
        state.append_threat_batch("C2", vec![threat("T4"), threat("T5")]);
        assert_eq!(state.threat_count_for("C2"), 3);
        assert_eq!(state.flattened_threats().len(), 5);
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_append_threat_batch_does_not_deduplicate() {
        let mut state = state();
        state.append_threat_batch("C1", vec![threat("T1")]);
        assert_eq!(state.threat_count_for("C1"), 3);
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_append_threat_batch_to_earlier_component_lands_at_the_tail() {
        let mut state = state();
        state.append_threat_batch("C1", vec![threat("T4")]);
        let last = state.flattened_threats().last().unwrap();
        assert_eq!(last.component_id, "C1");
        assert_eq!(last.threat.id, "T4");
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_append_to_unknown_component_is_a_no_op() {
        let mut state = state();
        state.append_threat_batch("C9", vec![threat("T9")]);
        assert_eq!(state.flattened_threats().len(), 3);
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_remove_component_removes_its_flattened_threats() {
        let mut state = state();
        state.remove_component("C1");
        assert!(state.component("C1").is_none());
        assert_eq!(state.flattened_threats().len(), 1);
        assert_eq!(state.flattened_threats()[0].threat.id, "T3");
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_update_threat_action_hits_both_representations() {
        let mut state = state();
        state.update_threat_action("C1", "T2", ThreatAction::Avoid, "removed feature".into());
        let nested = state.threat("C1", "T2").unwrap();
        assert_eq!(nested.action, Some(ThreatAction::Avoid));
        let flat = state
            .flattened_threats()
            .iter()
            .find(|f| f.threat.id == "T2")
            .unwrap();
        assert_eq!(flat.threat.reason.as_deref(), Some("removed feature"));
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_remove_threat() {
        let mut state = state();
        state.remove_threat("C1", "T1");
        assert_eq!(state.threat_count_for("C1"), 1);
        assert!(state
            .flattened_threats()
            .iter()
            .all(|f| f.threat.id != "T1"));
        assert_flatten_invariant(&state);
    }

    #[test]
    fn test_append_components_keeps_existing_ones() {
        let mut state = state();
        state.append_components(vec![component("C3", vec![threat("T7")])]);
        assert_eq!(state.components().len(), 3);
        assert_eq!(state.flattened_threats().len(), 4);
        assert_flatten_invariant(&state);
    }
}
