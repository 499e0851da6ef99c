/// Ports layer - Interface definitions for hexagonal architecture
pub mod outbound;
