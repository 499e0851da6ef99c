/// Multi-select state for bulk component deletion.
///
/// A component is selectable only while it has zero threats; toggle
/// attempts on threat-bearing components are no-ops. Entering or leaving
/// bulk mode always clears the selection.
#[derive(Debug, Default)]
pub struct BulkSelection {
    active: bool,
    selected: Vec<String>,
}

impl BulkSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle_mode(&mut self) {
        self.active = !self.active;
        self.selected.clear();
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.selected.clear();
    }

    /// Toggles a component in or out of the selection. Components with
    /// threats attached are never selectable; deselection is always
    /// allowed.
    pub fn toggle(&mut self, component_id: &str, threat_count: usize) {
        if !self.active {
            return;
        }
        if let Some(pos) = self.selected.iter().position(|id| id == component_id) {
            self.selected.remove(pos);
        } else if threat_count == 0 {
            self.selected.push(component_id.to_string());
        }
    }

    pub fn is_selected(&self, component_id: &str) -> bool {
        self.selected.iter().any(|id| id == component_id)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Empties the selection, returning the ids that were selected.
    pub fn take_selected(&mut self) -> Vec<String> {
        std::mem::take(&mut self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_mode_clears_selection() {
        let mut selection = BulkSelection::new();
        selection.toggle_mode();
        selection.toggle("C1", 0);
        assert_eq!(selection.len(), 1);
        selection.toggle_mode();
        assert!(selection.is_empty());
        assert!(!selection.is_active());
    }

    #[test]
    fn test_components_with_threats_are_not_selectable() {
        let mut selection = BulkSelection::new();
        selection.toggle_mode();
        selection.toggle("C1", 3);
        assert!(!selection.is_selected("C1"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_selects_and_deselects() {
        let mut selection = BulkSelection::new();
        selection.toggle_mode();
        selection.toggle("C1", 0);
        assert!(selection.is_selected("C1"));
        selection.toggle("C1", 0);
        assert!(!selection.is_selected("C1"));
    }

    #[test]
    fn test_toggle_outside_bulk_mode_is_noop() {
        let mut selection = BulkSelection::new();
        selection.toggle("C1", 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_take_selected_empties() {
        let mut selection = BulkSelection::new();
        selection.toggle_mode();
        selection.toggle("C1", 0);
        selection.toggle("C2", 0);
        let ids = selection.take_selected();
        assert_eq!(ids, vec!["C1".to_string(), "C2".to_string()]);
        assert!(selection.is_empty());
    }
}
