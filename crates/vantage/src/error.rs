use std::path::PathBuf;

use vantage_registry::RegistryError;
use vantage_storage::{Capabilities, StoreError};

/// Problems turning [`Options`](crate::Options) into a [`Config`](crate::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("cannot read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid configuration in {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// The backend tag names no known backend.
	#[error("unknown backend {name:?} (expected redis or memory)")]
	UnknownBackend { name: String },

	/// A provided store cannot serve the operations definitions need.
	#[error("{backend} store is missing required operations: {missing:?}")]
	UnsupportedStore { backend: &'static str, missing: Capabilities },

	#[error("invalid connection settings: {0}")]
	InvalidUrl(#[source] StoreError),
}

/// Playground failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error(transparent)]
	Storage(#[from] StoreError),

	#[error("unknown experiment kind {0:?}")]
	UnknownExperimentKind(String),

	/// [`init`](crate::init) ran after the process-wide playground existed.
	#[error("the process-wide playground is already initialized")]
	AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;
