//! Lazily populated registries of experiment and metric definitions.
//!
//! Each registry owns a directory of TOML definition files. The first lookup
//! runs a population pass that loads every file once, persists each
//! definition through the storage binding, and caches the result until
//! [`DefinitionRegistry::reset`].
//!
//! # Cross-registry loading
//!
//! Experiments reference metrics by name. An experiment pass resolves them
//! through the metric registry, populating it within the same [`LoadScope`]
//! so re-entrant loads are caught across both. Metrics never reference
//! experiments; locks are always taken experiments first.

pub mod core;
pub mod domains;
mod error;
#[cfg(test)]
mod testing;

pub use crate::core::{
	Catalog, Definition, DefinitionRegistry, DefinitionScript, Fields, LoadContext, LoadEnv, LoadScope, RegistryKind,
};
pub use domains::{experiments, metrics};
pub use error::{RegistryError, Result};
pub use experiments::{AbTest, AlternativeReport, AlternativeValue, Experiment, ExperimentBuilder, ExperimentKind};
pub use metrics::{METRIC_KINDS, Metric, MetricKind};
