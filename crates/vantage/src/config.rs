use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use vantage_primitives::{SharedLogger, TracingLogger};
use vantage_storage::{BackendKind, BackendSpec, Capabilities, ConnectionParams, Store};

use crate::ConfigError;

/// Product name the storage namespace is derived from.
pub const PRODUCT: &str = "vantage";

/// Subdirectory of the load path holding metric definitions.
pub const METRICS_DIR: &str = "metrics";

/// Caller-supplied settings; anything left unset takes its default.
///
/// Deserializable from TOML:
///
/// ```toml
/// host = "127.0.0.1"
/// port = 6379
/// db = 0
/// load_path = "experiments"
/// collecting = true
/// backend = "memory"
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
	pub host: Option<String>,
	pub port: Option<u16>,
	pub db: Option<i64>,
	pub password: Option<String>,
	/// `redis://` URL; overrides host, port, db and password.
	pub url: Option<String>,
	/// Backend by name: `redis` or `memory`.
	pub backend: Option<String>,
	pub load_path: Option<PathBuf>,
	/// When `false`, tracking calls are accepted and dropped.
	pub collecting: Option<bool>,
	/// Pre-built store; takes precedence over every other backend setting.
	#[serde(skip)]
	pub store: Option<Arc<dyn Store>>,
	#[serde(skip)]
	pub logger: Option<SharedLogger>,
}

impl Options {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&text).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}
}

impl fmt::Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("db", &self.db)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.field("url", &self.url.as_ref().map(|_| "<redacted>"))
			.field("backend", &self.backend)
			.field("load_path", &self.load_path)
			.field("collecting", &self.collecting)
			.field("store", &self.store.as_ref().map(|s| s.backend_name()))
			.field("logger", &self.logger.is_some())
			.finish()
	}
}

/// Resolved playground configuration. Immutable once built.
#[derive(Clone)]
pub struct Config {
	params: ConnectionParams,
	backend: BackendSpec,
	namespace: String,
	load_path: PathBuf,
	collecting: bool,
	logger: SharedLogger,
}

impl Config {
	/// Merges `options` over the defaults and resolves the backend.
	///
	/// Backend precedence: a provided store, then the backend tag, then the
	/// connection URL, then host/port/db/password.
	pub fn configure(options: Options) -> Result<Self, ConfigError> {
		let defaults = ConnectionParams::default();
		let params = ConnectionParams {
			host: options.host.unwrap_or(defaults.host),
			port: options.port.unwrap_or(defaults.port),
			db: options.db.unwrap_or(defaults.db),
			password: options.password,
			url: options.url,
		};

		let backend = match (options.store, options.backend.as_deref()) {
			(Some(store), _) => {
				let missing = Capabilities::REQUIRED.difference(store.capabilities());
				if !missing.is_empty() {
					return Err(ConfigError::UnsupportedStore {
						backend: store.backend_name(),
						missing,
					});
				}
				BackendSpec::Instance(store)
			}
			(None, Some(name)) => {
				let kind: BackendKind = name.parse().map_err(|_| ConfigError::UnknownBackend { name: name.to_owned() })?;
				BackendSpec::Kind(kind, params.clone())
			}
			(None, None) => BackendSpec::Params(params.clone()),
		};

		if matches!(backend, BackendSpec::Params(_) | BackendSpec::Kind(BackendKind::Redis, _)) {
			params.to_url().map_err(ConfigError::InvalidUrl)?;
		}

		Ok(Self {
			params,
			backend,
			namespace: default_namespace(),
			load_path: options.load_path.unwrap_or_else(|| PathBuf::from("experiments")),
			collecting: options.collecting.unwrap_or(true),
			logger: options.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
		})
	}

	/// Reads [`Options`] from a TOML file, then [`configure`](Self::configure)s.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		Self::configure(Options::from_file(path)?)
	}

	pub fn connection_params(&self) -> &ConnectionParams {
		&self.params
	}

	pub fn backend(&self) -> &BackendSpec {
		&self.backend
	}

	/// Prefix for every storage key, `vantage:<major version>`.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Directory holding experiment definitions.
	pub fn load_path(&self) -> &Path {
		&self.load_path
	}

	/// Directory holding metric definitions.
	pub fn metrics_path(&self) -> PathBuf {
		self.load_path.join(METRICS_DIR)
	}

	pub fn collecting(&self) -> bool {
		self.collecting
	}

	pub fn logger(&self) -> &SharedLogger {
		&self.logger
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			params: ConnectionParams::default(),
			backend: BackendSpec::default(),
			namespace: default_namespace(),
			load_path: PathBuf::from("experiments"),
			collecting: true,
			logger: Arc::new(TracingLogger),
		}
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("backend", &self.backend)
			.field("namespace", &self.namespace)
			.field("load_path", &self.load_path)
			.field("collecting", &self.collecting)
			.finish_non_exhaustive()
	}
}

fn default_namespace() -> String {
	format!("{PRODUCT}:{}", env!("CARGO_PKG_VERSION_MAJOR"))
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;
	use vantage_storage::{MemoryStore, Result as StoreResult};

	use super::*;

	/// Memory store that refuses batch reads.
	struct NoBatch(MemoryStore);

	impl Store for NoBatch {
		fn backend_name(&self) -> &'static str {
			"no-batch"
		}

		fn capabilities(&self) -> Capabilities {
			self.0.capabilities().difference(Capabilities::MGET)
		}

		fn get(&self, key: &str) -> StoreResult<Option<String>> {
			self.0.get(key)
		}

		fn set(&self, key: &str, value: &str) -> StoreResult<()> {
			self.0.set(key, value)
		}

		fn set_nx(&self, key: &str, value: &str) -> StoreResult<bool> {
			self.0.set_nx(key, value)
		}

		fn mget(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
			self.0.mget(keys)
		}

		fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
			self.0.incr_by(key, delta)
		}

		fn del(&self, keys: &[String]) -> StoreResult<u64> {
			self.0.del(keys)
		}
	}

	#[test]
	fn defaults() {
		let config = Config::configure(Options::default()).unwrap();
		assert_eq!(config.connection_params(), &ConnectionParams::default());
		assert_eq!(config.namespace(), format!("vantage:{}", env!("CARGO_PKG_VERSION_MAJOR")));
		assert_eq!(config.load_path(), Path::new("experiments"));
		assert_eq!(config.metrics_path(), Path::new("experiments/metrics"));
		assert!(config.collecting());
		assert!(matches!(config.backend(), BackendSpec::Params(_)));
	}

	#[test]
	fn options_override_defaults() {
		let config = Config::configure(Options {
			host: Some("cache".into()),
			db: Some(3),
			load_path: Some("/tmp/defs".into()),
			collecting: Some(false),
			..Options::default()
		})
		.unwrap();
		assert_eq!(config.connection_params().host, "cache");
		assert_eq!(config.connection_params().port, 6379);
		assert_eq!(config.connection_params().db, 3);
		assert_eq!(config.load_path(), Path::new("/tmp/defs"));
		assert!(!config.collecting());
	}

	#[test]
	fn backend_tag_selects_a_kind() {
		let config = Config::configure(Options {
			backend: Some("memory".into()),
			..Options::default()
		})
		.unwrap();
		assert!(matches!(config.backend(), BackendSpec::Kind(BackendKind::Memory, _)));

		let err = Config::configure(Options {
			backend: Some("mongodb".into()),
			..Options::default()
		})
		.unwrap_err();
		assert!(matches!(err, ConfigError::UnknownBackend { ref name } if name == "mongodb"), "{err}");
	}

	#[test]
	fn provided_store_wins_over_tag() {
		let config = Config::configure(Options {
			backend: Some("redis".into()),
			store: Some(Arc::new(MemoryStore::new())),
			..Options::default()
		})
		.unwrap();
		assert!(matches!(config.backend(), BackendSpec::Instance(_)));
	}

	#[test]
	fn store_without_batch_reads_is_rejected() {
		let err = Config::configure(Options {
			store: Some(Arc::new(NoBatch(MemoryStore::new()))),
			..Options::default()
		})
		.unwrap_err();
		match err {
			ConfigError::UnsupportedStore { backend, missing } => {
				assert_eq!(backend, "no-batch");
				assert_eq!(missing, Capabilities::MGET);
			}
			other => panic!("expected unsupported store, got {other:?}"),
		}
	}

	#[test]
	fn malformed_url_is_rejected() {
		let err = Config::configure(Options {
			url: Some("not a url".into()),
			..Options::default()
		})
		.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidUrl(_)), "{err}");
	}

	#[test]
	fn reads_toml_files() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "port = 6380\nbackend = \"memory\"\nload_path = \"defs\"\ncollecting = false").unwrap();

		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.connection_params().port, 6380);
		assert_eq!(config.load_path(), Path::new("defs"));
		assert!(!config.collecting());
		assert!(matches!(config.backend(), BackendSpec::Kind(BackendKind::Memory, _)));
	}

	#[test]
	fn unknown_keys_in_files_are_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "hostname = \"cache\"").unwrap();

		let err = Config::from_file(file.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err = Config::from_file("/nonexistent/vantage.toml").unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }), "{err}");
	}
}
