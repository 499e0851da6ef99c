use crate::shared::{Result, WorkflowError};
use crate::threat_model::domain::ThreatType;

/// Multi-select switches choosing which STRIDE categories the generator
/// should cover. Independent of the single-select display filter. The
/// last enabled category can never be switched off.
#[derive(Debug, Clone)]
pub struct GenerationSwitches {
    enabled: Vec<ThreatType>,
}

impl Default for GenerationSwitches {
    fn default() -> Self {
        Self {
            enabled: ThreatType::ALL.to_vec(),
        }
    }
}

impl GenerationSwitches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one category. Disabling is refused when it would leave no
    /// category enabled.
    pub fn toggle(&mut self, threat_type: ThreatType) {
        if let Some(pos) = self.enabled.iter().position(|t| *t == threat_type) {
            if self.enabled.len() > 1 {
                self.enabled.remove(pos);
            }
        } else {
            self.enabled.push(threat_type);
        }
    }

    /// Replaces the selection wholesale, e.g. from CLI flags.
    pub fn enable_only(&mut self, threat_types: &[ThreatType]) -> Result<()> {
        if threat_types.is_empty() {
            return Err(WorkflowError::Validation {
                message: "at least one threat type must be enabled".to_string(),
            }
            .into());
        }
        let mut deduped: Vec<ThreatType> = Vec::new();
        for ty in threat_types {
            if !deduped.contains(ty) {
                deduped.push(*ty);
            }
        }
        self.enabled = deduped;
        Ok(())
    }

    pub fn is_enabled(&self, threat_type: ThreatType) -> bool {
        self.enabled.contains(&threat_type)
    }

    pub fn enabled(&self) -> &[ThreatType] {
        &self.enabled
    }
}
