use std::fmt;
use std::sync::Arc;

use crate::{Capabilities, Result, Store};

/// A store scoped to one namespace.
///
/// Every key is prefixed with `"<namespace>:"` before it reaches the backend.
pub struct Keyspace {
	store: Arc<dyn Store>,
	namespace: Arc<str>,
}

impl Keyspace {
	pub fn new(store: Arc<dyn Store>, namespace: impl Into<Arc<str>>) -> Self {
		Self {
			store,
			namespace: namespace.into(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn backend_name(&self) -> &'static str {
		self.store.backend_name()
	}

	pub fn capabilities(&self) -> Capabilities {
		self.store.capabilities()
	}

	/// Returns the fully qualified key as the backend sees it.
	pub fn key(&self, key: &str) -> String {
		format!("{}:{key}", self.namespace)
	}

	pub fn get(&self, key: &str) -> Result<Option<String>> {
		self.store.get(&self.key(key))
	}

	pub fn set(&self, key: &str, value: &str) -> Result<()> {
		self.store.set(&self.key(key), value)
	}

	pub fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
		self.store.set_nx(&self.key(key), value)
	}

	pub fn mget<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<Option<String>>> {
		if keys.is_empty() {
			return Ok(Vec::new());
		}
		let scoped: Vec<String> = keys.iter().map(|k| self.key(k.as_ref())).collect();
		self.store.mget(&scoped)
	}

	pub fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
		self.store.incr_by(&self.key(key), delta)
	}

	pub fn del<K: AsRef<str>>(&self, keys: &[K]) -> Result<u64> {
		if keys.is_empty() {
			return Ok(0);
		}
		let scoped: Vec<String> = keys.iter().map(|k| self.key(k.as_ref())).collect();
		self.store.del(&scoped)
	}
}

impl fmt::Debug for Keyspace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Keyspace")
			.field("backend", &self.store.backend_name())
			.field("namespace", &self.namespace)
			.finish()
	}
}
