//! Domain layer for the threat-modelling workflow: diagrams, components,
//! STRIDE threats with DREAD scores, and the pure state services the
//! workflow view is built from.

pub mod domain;
pub mod policies;
pub mod services;
