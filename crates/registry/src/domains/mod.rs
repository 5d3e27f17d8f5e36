//! Definition kinds the registries load.

pub mod experiments;
pub mod metrics;
