use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{Capabilities, Result, Store, StoreError};

/// Non-persistent stand-in for a live backend.
///
/// Everything lives in one map behind a mutex, so compound operations
/// (`set_nx`, `incr_by`) are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of keys currently stored.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}

impl Store for MemoryStore {
	fn backend_name(&self) -> &'static str {
		"memory"
	}

	fn capabilities(&self) -> Capabilities {
		Capabilities::all()
	}

	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries.lock().insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
		let mut entries = self.entries.lock();
		if entries.contains_key(key) {
			return Ok(false);
		}
		entries.insert(key.to_owned(), value.to_owned());
		Ok(true)
	}

	fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
		let entries = self.entries.lock();
		Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
	}

	fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
		let mut entries = self.entries.lock();
		let current = match entries.get(key) {
			Some(value) => value.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
				key: key.to_owned(),
				value: value.clone(),
			})?,
			None => 0,
		};
		let next = current
			.checked_add(delta)
			.ok_or_else(|| StoreError::Overflow { key: key.to_owned() })?;
		entries.insert(key.to_owned(), next.to_string());
		Ok(next)
	}

	fn del(&self, keys: &[String]) -> Result<u64> {
		let mut entries = self.entries.lock();
		Ok(keys.iter().filter(|key| entries.remove(key.as_str()).is_some()).count() as u64)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn get_set_roundtrip() {
		let store = MemoryStore::new();
		assert_eq!(store.get("k").unwrap(), None);
		store.set("k", "v").unwrap();
		assert_eq!(store.get("k").unwrap(), Some("v".to_owned()));
	}

	#[test]
	fn set_nx_keeps_first_value() {
		let store = MemoryStore::new();
		assert!(store.set_nx("k", "first").unwrap());
		assert!(!store.set_nx("k", "second").unwrap());
		assert_eq!(store.get("k").unwrap().as_deref(), Some("first"));
	}

	#[test]
	fn mget_is_positional() {
		let store = MemoryStore::new();
		store.set("a", "1").unwrap();
		store.set("c", "3").unwrap();
		let keys = ["a", "b", "c"].map(String::from);
		assert_eq!(store.mget(&keys).unwrap(), vec![Some("1".to_owned()), None, Some("3".to_owned())]);
	}

	#[test]
	fn counters_start_at_zero() {
		let store = MemoryStore::new();
		assert_eq!(store.incr_by("n", 3).unwrap(), 3);
		assert_eq!(store.incr_by("n", -1).unwrap(), 2);
		assert_eq!(store.get("n").unwrap().as_deref(), Some("2"));
	}

	#[test]
	fn counter_overflow_is_rejected() {
		let store = MemoryStore::new();
		assert_eq!(store.incr_by("n", i64::MAX).unwrap(), i64::MAX);
		assert!(matches!(store.incr_by("n", 1), Err(StoreError::Overflow { ref key }) if key == "n"));
		assert_eq!(store.get("n").unwrap(), Some(i64::MAX.to_string()));

		assert_eq!(store.incr_by("m", i64::MIN).unwrap(), i64::MIN);
		assert!(matches!(store.incr_by("m", -1), Err(StoreError::Overflow { .. })));
	}

	#[test]
	fn counter_rejects_non_integer() {
		let store = MemoryStore::new();
		store.set("n", "abc").unwrap();
		assert!(matches!(store.incr_by("n", 1), Err(StoreError::NotAnInteger { .. })));
	}

	#[test]
	fn del_counts_existing_keys() {
		let store = MemoryStore::new();
		store.set("a", "1").unwrap();
		let keys = ["a", "b"].map(String::from);
		assert_eq!(store.del(&keys).unwrap(), 1);
		assert!(store.is_empty());
	}

	#[test]
	fn concurrent_increments_are_not_lost() {
		let store = Arc::new(MemoryStore::new());
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let store = Arc::clone(&store);
				thread::spawn(move || {
					for _ in 0..100 {
						store.incr_by("hits", 1).unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(store.get("hits").unwrap().as_deref(), Some("800"));
	}
}
