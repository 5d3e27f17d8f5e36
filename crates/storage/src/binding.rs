use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use vantage_primitives::SharedLogger;

use crate::{BackendKind, BackendSpec, Keyspace, MemoryStore, RedisStore, Result, Store};

/// Where the binding is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
	/// Nothing has asked for storage yet.
	Unbound,
	/// A backend built from the configured [`BackendSpec`] is in use.
	Live,
	/// An in-memory stand-in was installed by [`Binding::use_mock`].
	Mocked,
}

struct Bound {
	keyspace: Arc<Keyspace>,
	mocked: bool,
}

/// Lazily established, memoized storage connection.
pub struct Binding {
	spec: BackendSpec,
	namespace: Arc<str>,
	logger: SharedLogger,
	slot: Mutex<Option<Bound>>,
}

impl Binding {
	pub fn new(spec: BackendSpec, namespace: impl Into<Arc<str>>, logger: SharedLogger) -> Self {
		Self {
			spec,
			namespace: namespace.into(),
			logger,
			slot: Mutex::new(None),
		}
	}

	/// Returns the active keyspace, connecting on first use.
	///
	/// A failed connection attempt is not memoized; the next call retries.
	pub fn connection(&self) -> Result<Arc<Keyspace>> {
		let mut slot = self.slot.lock();
		if let Some(bound) = slot.as_ref() {
			return Ok(Arc::clone(&bound.keyspace));
		}

		let store = match self.open() {
			Ok(store) => store,
			Err(err) => {
				self.logger.error(&format!("storage connection to {} failed: {err}", self.spec.describe()));
				return Err(err);
			}
		};
		self.logger
			.info(&format!("storage bound to {} ({}) under namespace {}", self.spec.describe(), store.backend_name(), self.namespace));

		let keyspace = Arc::new(Keyspace::new(store, Arc::clone(&self.namespace)));
		*slot = Some(Bound {
			keyspace: Arc::clone(&keyspace),
			mocked: false,
		});
		Ok(keyspace)
	}

	/// Installs an in-memory store if nothing is bound yet.
	///
	/// Returns `true` when the mock was installed, `false` when a handle
	/// already existed and was left untouched.
	pub fn use_mock(&self) -> bool {
		let mut slot = self.slot.lock();
		if slot.is_some() {
			self.logger.debug("storage already bound; mock request ignored");
			return false;
		}
		let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
		*slot = Some(Bound {
			keyspace: Arc::new(Keyspace::new(store, Arc::clone(&self.namespace))),
			mocked: true,
		});
		self.logger.info(&format!("storage mocked in memory under namespace {}", self.namespace));
		true
	}

	pub fn state(&self) -> BindingState {
		match self.slot.lock().as_ref() {
			None => BindingState::Unbound,
			Some(bound) if bound.mocked => BindingState::Mocked,
			Some(_) => BindingState::Live,
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	fn open(&self) -> Result<Arc<dyn Store>> {
		Ok(match &self.spec {
			BackendSpec::Instance(store) => Arc::clone(store),
			BackendSpec::Kind(BackendKind::Memory, _) => Arc::new(MemoryStore::new()),
			BackendSpec::Params(params) | BackendSpec::Kind(BackendKind::Redis, params) => Arc::new(RedisStore::connect(params)?),
		})
	}
}

impl fmt::Debug for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binding")
			.field("spec", &self.spec)
			.field("namespace", &self.namespace)
			.field("state", &self.state())
			.finish()
	}
}
