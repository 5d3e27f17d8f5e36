//! Experiment playground.
//!
//! A [`Playground`] ties together a resolved [`Config`], a lazily connected
//! storage binding, and the experiment and metric registries. Most programs
//! use one per process through [`init`] and [`playground`]:
//!
//! ```no_run
//! let playground = vantage::init(vantage::Config::default())?;
//! playground.track("signups", 1)?;
//! # Ok::<(), vantage::Error>(())
//! ```

mod config;
mod error;
mod global;
mod playground;

pub use config::{Config, METRICS_DIR, Options, PRODUCT};
pub use error::{ConfigError, Error, Result};
pub use global::{init, playground};
pub use playground::Playground;
pub use vantage_primitives::{Identifier, Identity, Logger, SharedLogger, TracingLogger, identity};
pub use vantage_registry::{
	AbTest, AlternativeReport, AlternativeValue, Catalog, Definition, Experiment, ExperimentBuilder, ExperimentKind,
	Metric, MetricKind, RegistryError,
};
pub use vantage_storage::{BackendKind, BindingState, Capabilities, Keyspace, MemoryStore, Store, StoreError};
