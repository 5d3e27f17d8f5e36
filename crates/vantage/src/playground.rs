use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use vantage_primitives::Identifier;
use vantage_registry::{
	Catalog, Definition, DefinitionRegistry, Experiment, ExperimentBuilder, ExperimentKind, Fields, LoadEnv, Metric,
	RegistryError, RegistryKind,
};
use vantage_storage::{Binding, BindingState, Keyspace};

use crate::{Config, Error, Options, Result};


/// Entry point for looking up experiments and metrics.
///
/// Owns the configuration, the storage binding and both registries.
/// Registries populate on first use; [`reload`](Self::reload) makes the next
/// lookup read the definition files again.
pub struct Playground {
	config: Config,
	binding: Binding,
	experiments: DefinitionRegistry<Experiment>,
	metrics: DefinitionRegistry<Metric>,
}

impl Playground {
	pub fn new(config: Config) -> Self {
		let binding = Binding::new(config.backend().clone(), config.namespace(), Arc::clone(config.logger()));
		Self {
			experiments: DefinitionRegistry::new(config.load_path()),
			metrics: DefinitionRegistry::new(config.metrics_path()),
			binding,
			config,
		}
	}

	pub fn configure(options: Options) -> Result<Self> {
		Ok(Self::new(Config::configure(options)?))
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	fn env(&self) -> LoadEnv<'_> {
		LoadEnv {
			binding: &self.binding,
			metrics: &self.metrics,
			logger: &**self.config.logger(),
		}
	}

	/// Drops every loaded definition; the storage binding is kept.
	pub fn reload(&self) {
		self.config.logger().info("reloading experiment and metric definitions");
		self.metrics.reset();
		self.experiments.reset();
	}

	/// Populates both registries now instead of on first lookup.
	pub fn load(&self) -> Result<()> {
		let env = self.env();
		self.experiments.all(&env)?;
		self.metrics.all(&env)?;
		Ok(())
	}

	pub fn experiment(&self, name: &str) -> Result<Arc<Experiment>> {
		Ok(self.experiments.get(name, &self.env())?)
	}

	pub fn metric(&self, name: &str) -> Result<Arc<Metric>> {
		Ok(self.metrics.get(name, &self.env())?)
	}

	pub fn experiments(&self) -> Result<Arc<Catalog<Experiment>>> {
		Ok(self.experiments.all(&self.env())?)
	}

	pub fn metrics(&self) -> Result<Arc<Catalog<Metric>>> {
		Ok(self.metrics.all(&self.env())?)
	}

	/// Adds `count` to a metric and credits experiments that measure it.
	///
	/// Conversions go to the identity bound to the calling thread.
	pub fn track(&self, metric: &str, count: i64) -> Result<()> {
		self.track_at(metric, count, Utc::now())
	}

	/// [`track`](Self::track) with an explicit timestamp.
	pub fn track_at(&self, metric: &str, count: i64, at: DateTime<Utc>) -> Result<()> {
		let metric = self.metric(metric)?;
		if !self.config.collecting() {
			self.config
				.logger()
				.debug(&format!("not collecting; dropped {count} for metric {}", metric.id()));
			return Ok(());
		}

		let experiments = self.experiments()?;
		let store = self.connection()?;
		metric.track(&store, count, at)?;
		for experiment in experiments.values().filter(|e| e.measures(metric.id())) {
			experiment.convert_current(&store, count)?;
		}
		Ok(())
	}

	/// Active storage handle, connecting on first use.
	pub fn connection(&self) -> Result<Arc<Keyspace>> {
		Ok(self.binding.connection()?)
	}

	/// Switches to in-memory storage unless a connection already exists.
	pub fn use_mock(&self) -> bool {
		self.binding.use_mock()
	}

	pub fn binding_state(&self) -> BindingState {
		self.binding.state()
	}

	pub fn is_collecting(&self) -> bool {
		self.config.collecting()
	}

	/// Defines an experiment in code.
	///
	/// `options` holds the same keys a definition file body would; `build`
	/// runs afterwards on the builder.
	#[deprecated(note = "put a definition file in the load path instead")]
	pub fn define(
		&self,
		name: &str,
		kind: &str,
		options: toml::Table,
		build: impl FnOnce(&mut ExperimentBuilder) -> Result<()>,
	) -> Result<Arc<Experiment>> {
		let kind: ExperimentKind = kind.parse().map_err(|_| Error::UnknownExperimentKind(kind.to_owned()))?;
		let env = self.env();
		let id = Identifier::normalize(name);

		let catalog = self.experiments.all(&env)?;
		if catalog.contains(&id) {
			return Err(RegistryError::DuplicateDefinition {
				kind: RegistryKind::Experiment,
				first: catalog.source(&id).map(Path::to_path_buf),
				second: None,
				id,
			}
			.into());
		}

		let origin = format!("define({name})");
		let mut builder = ExperimentBuilder::new(kind, name, origin.as_str());
		builder.apply(Fields::new(origin, options), |metric| self.metrics.get(metric, &env))?;
		build(&mut builder)?;

		let experiment = self.experiments.insert(builder.build()?, &env)?;
		self.config
			.logger()
			.info(&format!("defined experiment {} in code", experiment.id()));
		Ok(experiment)
	}
}

impl std::fmt::Debug for Playground {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Playground")
			.field("config", &self.config)
			.field("binding", &self.binding.state())
			.field("experiments", &self.experiments)
			.field("metrics", &self.metrics)
			.finish()
	}
}
