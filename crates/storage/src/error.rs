/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// The backend could not be reached when the binding first connected.
	#[error("cannot connect to {target}: {source}")]
	Connection {
		target: String,
		#[source]
		source: redis::RedisError,
	},

	/// Connection parameters could not be turned into a backend address.
	#[error("invalid connection parameters: {0}")]
	InvalidParams(String),

	/// A command failed on a live backend.
	#[error("redis command failed: {0}")]
	Redis(#[from] redis::RedisError),

	/// A counter operation hit a value that is not an integer.
	#[error("value at {key:?} is not an integer: {value:?}")]
	NotAnInteger { key: String, value: String },

	/// A counter increment would leave the `i64` range.
	#[error("increment of {key:?} would overflow")]
	Overflow { key: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
