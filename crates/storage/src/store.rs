use crate::Result;

bitflags::bitflags! {
	/// Operations a store supports.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Capabilities: u32 {
		/// Single-key reads.
		const GET = 1 << 0;
		/// Single-key writes.
		const SET = 1 << 1;
		/// Write only if the key is absent.
		const SET_NX = 1 << 2;
		/// Batch reads.
		const MGET = 1 << 3;
		/// Atomic integer counters.
		const COUNTERS = 1 << 4;
		/// Key removal.
		const DELETE = 1 << 5;
	}
}

impl Capabilities {
	/// What the playground's definitions need from a backend.
	pub const REQUIRED: Self = Self::GET.union(Self::SET).union(Self::SET_NX).union(Self::MGET).union(Self::COUNTERS);
}

/// Key-value backend used by definitions.
///
/// Keys passed to a store are already namespaced; see [`crate::Keyspace`].
pub trait Store: Send + Sync {
	/// Short backend label for logs.
	fn backend_name(&self) -> &'static str;

	/// Operations this backend implements.
	fn capabilities(&self) -> Capabilities;

	fn get(&self, key: &str) -> Result<Option<String>>;

	fn set(&self, key: &str, value: &str) -> Result<()>;

	/// Sets `key` only if it does not exist. Returns whether the write happened.
	fn set_nx(&self, key: &str, value: &str) -> Result<bool>;

	/// Reads many keys at once; the result is positionally aligned with `keys`.
	fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

	/// Adds `delta` to the integer at `key` (missing keys count as 0) and returns the new value.
	fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

	/// Removes keys, returning how many existed.
	fn del(&self, keys: &[String]) -> Result<u64>;
}
