use std::path::PathBuf;

use vantage_primitives::Identifier;
use vantage_storage::StoreError;

use crate::core::RegistryKind;

/// Registry failures.
///
/// Errors raised while populating a registry abort the whole pass; nothing
/// from that pass is published.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	/// No definition with this identifier exists after population.
	#[error("unknown {kind}: {id}")]
	NotFound { kind: RegistryKind, id: Identifier },

	/// Two definitions in one pass normalize to the same identifier.
	#[error("duplicate {kind} {id}: defined in {} and {}", display_origin(first), display_origin(second))]
	DuplicateDefinition {
		kind: RegistryKind,
		id: Identifier,
		first: Option<PathBuf>,
		second: Option<PathBuf>,
	},

	/// A definition file re-entered its own load, directly or through others.
	#[error("cyclic load: {}", chain.join(" => "))]
	CyclicLoad { chain: Vec<String> },

	/// The file names no kind this registry knows.
	#[error("{}: no {kind} kind declared (expected one of: {})", path.display(), expected.join(", "))]
	UnknownKind {
		kind: RegistryKind,
		path: PathBuf,
		expected: Vec<&'static str>,
	},

	/// The file declares more than one kind.
	#[error("{}: several kinds declared: {}", path.display(), found.join(", "))]
	AmbiguousKind { path: PathBuf, found: Vec<String> },

	/// A definition body contains a key no builder call accepts.
	#[error("{origin}: unknown field '{field}'")]
	UnknownField { origin: String, field: String },

	/// A definition field has the wrong shape.
	#[error("{origin}: invalid value for '{field}': expected {expected}")]
	InvalidField {
		origin: String,
		field: String,
		expected: &'static str,
	},

	#[error("{}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("{}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Tracking was requested on a metric derived from other metrics.
	#[error("metric {id} is not trackable")]
	NotTrackable { id: Identifier },

	/// An experiment needed the current identity but none is bound.
	#[error("experiment {experiment} needs an identity, but none is bound to this thread")]
	MissingIdentity { experiment: Identifier },

	/// An outcome index outside the experiment's alternatives.
	#[error("experiment {experiment} has {len} alternatives; {index} is out of range")]
	InvalidOutcome { experiment: Identifier, index: usize, len: usize },

	/// A stored value could not be decoded.
	#[error("unreadable value at {key}: {value:?}")]
	InvalidStoredValue { key: String, value: String },

	#[error(transparent)]
	Storage(#[from] StoreError),
}

fn display_origin(origin: &Option<PathBuf>) -> String {
	match origin {
		Some(path) => path.display().to_string(),
		None => "<defined>".to_owned(),
	}
}

pub type Result<T> = std::result::Result<T, RegistryError>;
