use std::sync::Arc;

use tracing::Level;

/// Leveled logging sink.
///
/// Configuration carries one of these so embedders can route playground
/// messages into their own logging. The default is [`TracingLogger`].
pub trait Logger: Send + Sync {
	fn log(&self, level: Level, message: &str);

	fn info(&self, message: &str) {
		self.log(Level::INFO, message);
	}

	fn error(&self, message: &str) {
		self.log(Level::ERROR, message);
	}

	fn debug(&self, message: &str) {
		self.log(Level::DEBUG, message);
	}
}

/// Shared handle to a logger.
pub type SharedLogger = Arc<dyn Logger>;

/// Forwards messages to `tracing` events under the `vantage` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
	fn log(&self, level: Level, message: &str) {
		match level {
			Level::ERROR => tracing::error!(target: "vantage", "{message}"),
			Level::WARN => tracing::warn!(target: "vantage", "{message}"),
			Level::INFO => tracing::info!(target: "vantage", "{message}"),
			Level::DEBUG => tracing::debug!(target: "vantage", "{message}"),
			_ => tracing::trace!(target: "vantage", "{message}"),
		}
	}
}
