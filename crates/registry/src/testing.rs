use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use vantage_primitives::TracingLogger;
use vantage_storage::{BackendKind, BackendSpec, Binding, ConnectionParams, Keyspace};

use crate::{DefinitionRegistry, Experiment, LoadEnv, Metric};

/// Both registries over a temporary definition tree and an in-memory store.
pub(crate) struct Fixture {
	pub dir: TempDir,
	pub binding: Binding,
	pub experiments: DefinitionRegistry<Experiment>,
	pub metrics: DefinitionRegistry<Metric>,
	logger: TracingLogger,
}

impl Fixture {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().unwrap();
		let spec = BackendSpec::Kind(BackendKind::Memory, ConnectionParams::default());
		Self {
			binding: Binding::new(spec, "test:1", Arc::new(TracingLogger)),
			experiments: DefinitionRegistry::new(dir.path()),
			metrics: DefinitionRegistry::new(dir.path().join("metrics")),
			logger: TracingLogger,
			dir,
		}
	}

	pub fn env(&self) -> LoadEnv<'_> {
		LoadEnv {
			binding: &self.binding,
			metrics: &self.metrics,
			logger: &self.logger,
		}
	}

	pub fn store(&self) -> Arc<Keyspace> {
		self.binding.connection().unwrap()
	}

	pub fn experiment_file(&self, file: &str, text: &str) -> PathBuf {
		let path = self.dir.path().join(file);
		fs::write(&path, text).unwrap();
		path
	}

	pub fn metric_file(&self, file: &str, text: &str) -> PathBuf {
		let dir = self.dir.path().join("metrics");
		fs::create_dir_all(&dir).unwrap();
		let path = dir.join(file);
		fs::write(&path, text).unwrap();
		path
	}
}
