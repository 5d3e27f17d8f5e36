use parking_lot::Mutex;
use redis::Commands;

use crate::{Capabilities, ConnectionParams, Result, Store, StoreError};

/// Live Redis backend over a single synchronous connection.
///
/// Commands are serialized through a mutex; a hung server blocks the caller,
/// which owns timeout policy.
pub struct RedisStore {
	conn: Mutex<redis::Connection>,
	target: String,
}

impl RedisStore {
	/// Opens a connection, failing with [`StoreError::Connection`] when the
	/// server cannot be reached.
	pub fn connect(params: &ConnectionParams) -> Result<Self> {
		let url = params.to_url()?;
		let target = params.display_target();
		let client = redis::Client::open(url.as_str()).map_err(|e| StoreError::InvalidParams(format!("{target}: {e}")))?;
		let conn = client.get_connection().map_err(|source| StoreError::Connection {
			target: target.clone(),
			source,
		})?;
		Ok(Self {
			conn: Mutex::new(conn),
			target,
		})
	}

	/// Address this store is connected to, without credentials.
	pub fn target(&self) -> &str {
		&self.target
	}
}

impl Store for RedisStore {
	fn backend_name(&self) -> &'static str {
		"redis"
	}

	fn capabilities(&self) -> Capabilities {
		Capabilities::all()
	}

	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.conn.lock().get(key)?)
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		let () = self.conn.lock().set(key, value)?;
		Ok(())
	}

	fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
		Ok(self.conn.lock().set_nx(key, value)?)
	}

	fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
		if keys.is_empty() {
			return Ok(Vec::new());
		}
		let mut conn = self.conn.lock();
		Ok(redis::cmd("MGET").arg(keys).query(&mut *conn)?)
	}

	fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
		Ok(self.conn.lock().incr(key, delta)?)
	}

	fn del(&self, keys: &[String]) -> Result<u64> {
		if keys.is_empty() {
			return Ok(0);
		}
		Ok(self.conn.lock().del(keys)?)
	}
}
