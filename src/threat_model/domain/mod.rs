pub mod action_cache;
pub mod component;
pub mod diagram;
pub mod threat;

pub use action_cache::{ComponentThreatAction, ThreatActionCache};
pub use component::{sort_for_display, Component, ComponentType};
pub use diagram::{Diagram, DiagramStatus, DiagramSummary};
pub use threat::{DreadScores, FlattenedThreat, Threat, ThreatAction, ThreatType};

use serde::{Deserialize, Deserializer};

/// GraphQL returns `null` where Rust wants an empty collection or string;
/// decode both `null` and absent fields to the type's default.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
