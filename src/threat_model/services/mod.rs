pub mod bulk_selection;
pub mod generation_switches;
pub mod threat_filter;

pub use bulk_selection::BulkSelection;
pub use generation_switches::GenerationSwitches;
pub use threat_filter::ThreatFilter;
