use std::fmt;
use std::sync::Arc;

use strum_macros::{Display, EnumString};
use url::Url;

use crate::{Result, Store, StoreError};

/// Parameters for a live Redis connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
	pub host: String,
	pub port: u16,
	pub db: i64,
	pub password: Option<String>,
	/// Full `redis://` URL; overrides the individual fields when present.
	pub url: Option<String>,
}

impl Default for ConnectionParams {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 6379,
			db: 0,
			password: None,
			url: None,
		}
	}
}

impl ConnectionParams {
	/// Builds the connection URL, percent-encoding the password.
	pub fn to_url(&self) -> Result<Url> {
		if let Some(raw) = &self.url {
			return Url::parse(raw).map_err(|e| StoreError::InvalidParams(format!("{raw}: {e}")));
		}
		let mut url = Url::parse(&format!("redis://{}:{}/{}", self.host, self.port, self.db))
			.map_err(|e| StoreError::InvalidParams(format!("{}:{}: {e}", self.host, self.port)))?;
		if let Some(password) = &self.password {
			url.set_password(Some(password))
				.map_err(|()| StoreError::InvalidParams(format!("password not accepted for {}", self.host)))?;
		}
		Ok(url)
	}

	/// Address for logs and errors, never including the password.
	pub fn display_target(&self) -> String {
		match self.to_url() {
			Ok(mut url) => {
				let _ = url.set_password(None);
				url.to_string()
			}
			Err(_) => format!("{}:{}/{}", self.host, self.port, self.db),
		}
	}
}

impl fmt::Debug for ConnectionParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionParams")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("db", &self.db)
			.field("password", &self.password.as_ref().map(|_| "<redacted>"))
			.field("url", &self.url.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Closed set of backends selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BackendKind {
	/// Live Redis, using the configured connection parameters.
	Redis,
	/// In-process map; nothing survives the process.
	Memory,
}

/// How the binding obtains its store on first access.
#[derive(Clone)]
pub enum BackendSpec {
	/// Connect to Redis with explicit parameters.
	Params(ConnectionParams),
	/// Use a store the embedder already built.
	Instance(Arc<dyn Store>),
	/// Instantiate a backend by name; `Redis` falls back to the given parameters.
	Kind(BackendKind, ConnectionParams),
}

impl BackendSpec {
	/// Human-readable target for logs.
	pub fn describe(&self) -> String {
		match self {
			Self::Params(params) | Self::Kind(BackendKind::Redis, params) => params.display_target(),
			Self::Instance(store) => format!("{} (provided)", store.backend_name()),
			Self::Kind(BackendKind::Memory, _) => "memory".to_owned(),
		}
	}
}

impl Default for BackendSpec {
	fn default() -> Self {
		Self::Params(ConnectionParams::default())
	}
}

impl fmt::Debug for BackendSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Params(params) => f.debug_tuple("Params").field(params).finish(),
			Self::Instance(store) => f.debug_tuple("Instance").field(&store.backend_name()).finish(),
			Self::Kind(kind, params) => f.debug_tuple("Kind").field(kind).field(params).finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn backend_kind_parses_case_insensitively() {
		assert_eq!("redis".parse::<BackendKind>().unwrap(), BackendKind::Redis);
		assert_eq!("Memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
		assert!("mongodb".parse::<BackendKind>().is_err());
		assert_eq!(BackendKind::Memory.to_string(), "memory");
	}

	#[test]
	fn url_from_params_encodes_password() {
		let params = ConnectionParams {
			host: "cache.internal".to_owned(),
			port: 6380,
			db: 2,
			password: Some("p@ss word".to_owned()),
			url: None,
		};
		let url = params.to_url().unwrap();
		assert_eq!(url.host_str(), Some("cache.internal"));
		assert_eq!(url.port(), Some(6380));
		assert_eq!(url.path(), "/2");
		assert_eq!(url.password(), Some("p%40ss%20word"));
	}

	#[test]
	fn explicit_url_wins() {
		let params = ConnectionParams {
			url: Some("redis://other:7000/5".to_owned()),
			..ConnectionParams::default()
		};
		assert_eq!(params.to_url().unwrap().as_str(), "redis://other:7000/5");
	}

	#[test]
	fn display_target_hides_password() {
		let params = ConnectionParams {
			password: Some("secret".to_owned()),
			..ConnectionParams::default()
		};
		let target = params.display_target();
		assert!(!target.contains("secret"), "{target}");
		assert!(target.contains("127.0.0.1:6379/0"), "{target}");
	}
}
