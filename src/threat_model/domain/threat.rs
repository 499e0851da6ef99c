use crate::shared::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// STRIDE threat categories as named by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatType {
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    DenialOfService,
    ElevationOfPrivileges,
}

impl ThreatType {
    /// All six categories, in the order the generation switches present them.
    pub const ALL: [ThreatType; 6] = [
        ThreatType::Spoofing,
        ThreatType::Tampering,
        ThreatType::Repudiation,
        ThreatType::InformationDisclosure,
        ThreatType::DenialOfService,
        ThreatType::ElevationOfPrivileges,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatType::Spoofing => "Spoofing",
            ThreatType::Tampering => "Tampering",
            ThreatType::Repudiation => "Repudiation",
            ThreatType::InformationDisclosure => "InformationDisclosure",
            ThreatType::DenialOfService => "DenialOfService",
            ThreatType::ElevationOfPrivileges => "ElevationOfPrivileges",
        }
    }
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreatType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spoofing" | "s" => Ok(ThreatType::Spoofing),
            "tampering" | "t" => Ok(ThreatType::Tampering),
            "repudiation" | "r" => Ok(ThreatType::Repudiation),
            "informationdisclosure" | "information-disclosure" | "i" => {
                Ok(ThreatType::InformationDisclosure)
            }
            "denialofservice" | "denial-of-service" | "d" => Ok(ThreatType::DenialOfService),
            "elevationofprivileges" | "elevation-of-privileges" | "e" => {
                Ok(ThreatType::ElevationOfPrivileges)
            }
            _ => Err(format!(
                "Invalid threat type: {}. Expected one of: Spoofing, Tampering, Repudiation, InformationDisclosure, DenialOfService, ElevationOfPrivileges",
                s
            )),
        }
    }
}

/// Disposition chosen for a threat: Mitigate, Avoid, Transfer,
/// Accept/Ignore, or Not applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatAction {
    Mitigate,
    Avoid,
    Transfer,
    AcceptIgnore,
    NotApplicable,
}

impl ThreatAction {
    pub const ALL: [ThreatAction; 5] = [
        ThreatAction::Mitigate,
        ThreatAction::Avoid,
        ThreatAction::Transfer,
        ThreatAction::AcceptIgnore,
        ThreatAction::NotApplicable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatAction::Mitigate => "Mitigate",
            ThreatAction::Avoid => "Avoid",
            ThreatAction::Transfer => "Transfer",
            ThreatAction::AcceptIgnore => "AcceptIgnore",
            ThreatAction::NotApplicable => "NotApplicable",
        }
    }

    /// The question the action dialog asks when capturing a justification
    /// for this disposition.
    pub fn reason_prompt(self) -> &'static str {
        match self {
            ThreatAction::Mitigate => "How will you mitigate this threat?",
            ThreatAction::Avoid => "How will you be avoiding this threat?",
            ThreatAction::Transfer => "To whom are you transferring this threat?",
            ThreatAction::AcceptIgnore => "Why are you accepting or ignoring this threat?",
            ThreatAction::NotApplicable => "Why is this not applicable?",
        }
    }
}

impl fmt::Display for ThreatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreatAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mitigate" => Ok(ThreatAction::Mitigate),
            "avoid" => Ok(ThreatAction::Avoid),
            "transfer" => Ok(ThreatAction::Transfer),
            "acceptignore" | "accept-ignore" | "accept" | "ignore" => Ok(ThreatAction::AcceptIgnore),
            "notapplicable" | "not-applicable" | "na" => Ok(ThreatAction::NotApplicable),
            _ => Err(format!(
                "Invalid action: {}. Expected one of: Mitigate, Avoid, Transfer, AcceptIgnore, NotApplicable",
                s
            )),
        }
    }
}

/// DREAD rubric scores: five dimensions, each an integer from 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreadScores {
    pub damage: u8,
    pub reproducibility: u8,
    pub exploitability: u8,
    pub affected_users: u8,
    pub discoverability: u8,
}

impl DreadScores {
    /// Builds a score set, rejecting any dimension outside 1..=10.
    pub fn new(
        damage: u8,
        reproducibility: u8,
        exploitability: u8,
        affected_users: u8,
        discoverability: u8,
    ) -> Result<Self> {
        let scores = Self {
            damage,
            reproducibility,
            exploitability,
            affected_users,
            discoverability,
        };
        for (name, value) in scores.dimensions() {
            if !(1..=10).contains(&value) {
                return Err(WorkflowError::Validation {
                    message: format!("DREAD score '{}' must be between 1 and 10, got {}", name, value),
                }
                .into());
            }
        }
        Ok(scores)
    }

    /// Dimension labels paired with their values, in D-R-E-A-D order.
    pub fn dimensions(&self) -> [(&'static str, u8); 5] {
        [
            ("damage", self.damage),
            ("reproducibility", self.reproducibility),
            ("exploitability", self.exploitability),
            ("affectedUsers", self.affected_users),
            ("discoverability", self.discoverability),
        ]
    }

    /// Arithmetic mean over the five dimensions.
    pub fn mean(&self) -> f64 {
        let total: u32 = self.dimensions().iter().map(|(_, v)| u32::from(*v)).sum();
        f64::from(total) / 5.0
    }
}

/// A STRIDE-categorized risk against a component, scored by DREAD and
/// optionally dispositioned with an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub threat_type: ThreatType,
    pub dread_scores: DreadScores,
    #[serde(default)]
    pub action: Option<ThreatAction>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A threat carrying a back-reference to its owning component, used for
/// the flattened cross-component threat list. The back-reference is not
/// an ownership edge; the component's nested list stays authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedThreat {
    pub component_id: String,
    pub threat: Threat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> DreadScores {
        DreadScores::new(8, 6, 7, 9, 5).unwrap()
    }

    #[test]
    fn test_dread_scores_valid_range() {
        assert!(DreadScores::new(1, 1, 1, 1, 1).is_ok());
        assert!(DreadScores::new(10, 10, 10, 10, 10).is_ok());
    }

    #[test]
    fn test_dread_scores_rejects_zero() {
        let result = DreadScores::new(0, 5, 5, 5, 5);
        assert!(result.is_err());
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("damage"));
        assert!(err.contains("between 1 and 10"));
    }

    #[test]
    fn test_dread_scores_rejects_over_ten() {
        let result = DreadScores::new(5, 5, 5, 5, 11);
        assert!(result.is_err());
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("discoverability"));
    }

    #[test]
    fn test_dread_mean() {
        assert!((scores().mean() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dread_scores_wire_names() {
        let json = serde_json::to_value(scores()).unwrap();
        assert_eq!(json["affectedUsers"], 9);
        assert_eq!(json["damage"], 8);
    }

    #[test]
    fn test_threat_type_from_str() {
        assert_eq!(
            "information-disclosure".parse::<ThreatType>().unwrap(),
            ThreatType::InformationDisclosure
        );
        assert_eq!("Spoofing".parse::<ThreatType>().unwrap(), ThreatType::Spoofing);
        assert!("bogus".parse::<ThreatType>().is_err());
    }

    #[test]
    fn test_threat_action_from_str() {
        assert_eq!("accept".parse::<ThreatAction>().unwrap(), ThreatAction::AcceptIgnore);
        assert_eq!("na".parse::<ThreatAction>().unwrap(), ThreatAction::NotApplicable);
        assert!("shrug".parse::<ThreatAction>().is_err());
    }

    #[test]
    fn test_threat_decodes_graphql_shape() {
        let json = r#"{
            "id": "T1",
            "name": "Stolen session token",
            "description": "An attacker replays a captured session token",
            "threatType": "Spoofing",
            "dreadScores": {
                "damage": 8,
                "reproducibility": 6,
                "exploitability": 7,
                "affectedUsers": 9,
                "discoverability": 5
            },
            "action": null,
            "reason": null,
            "__typename": "Threat"
        }"#;
        let threat: Threat = serde_json::from_str(json).unwrap();
        assert_eq!(threat.id, "T1");
        assert_eq!(threat.threat_type, ThreatType::Spoofing);
        assert_eq!(threat.dread_scores.affected_users, 9);
        assert!(threat.action.is_none());
    }
}
