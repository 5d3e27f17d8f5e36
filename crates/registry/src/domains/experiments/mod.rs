//! Experiments loaded from `<load_path>/*.toml`.
//!
//! ```toml
//! ab_test = "Price options"
//! description = "Which price converts best?"
//! alternatives = [19, 25, 29]
//! metrics = ["signups"]
//! ```

use std::sync::Arc;

use strum::VariantNames;
use strum_macros::{Display, EnumString, VariantNames};
use vantage_primitives::Identifier;
use vantage_storage::Keyspace;

use crate::core::{Definition, DefinitionScript, LoadContext, RegistryKind};
use crate::metrics::Metric;
use crate::{RegistryError, Result};

mod builder;

pub use ab_test::{AbTest, AlternativeReport};
pub use builder::{AlternativeValue, ExperimentBuilder};

/// Experiment kinds, by the tag a definition declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum ExperimentKind {
	AbTest,
}

impl ExperimentKind {
	/// Every tag a definition may declare.
	pub const TAGS: &'static [&'static str] = <Self as VariantNames>::VARIANTS;
}

#[derive(Debug, Clone)]
pub enum Experiment {
	AbTest(AbTest),
}

impl Experiment {
	pub fn kind(&self) -> ExperimentKind {
		match self {
			Self::AbTest(_) => ExperimentKind::AbTest,
		}
	}

	pub fn description(&self) -> Option<&str> {
		match self {
			Self::AbTest(test) => test.description.as_deref(),
		}
	}

	/// Metrics whose tracking counts as a conversion.
	pub fn metrics(&self) -> &[Arc<Metric>] {
		match self {
			Self::AbTest(test) => &test.metrics,
		}
	}

	pub fn measures(&self, metric: &Identifier) -> bool {
		match self {
			Self::AbTest(test) => test.measures(metric),
		}
	}

	pub fn as_ab_test(&self) -> Option<&AbTest> {
		match self {
			Self::AbTest(test) => Some(test),
		}
	}

	pub fn is_active(&self, store: &Keyspace) -> Result<bool> {
		match self {
			Self::AbTest(test) => test.is_active(store),
		}
	}

	/// Records a conversion for the identity bound to the calling thread.
	///
	/// Without a bound identity there is no participant to credit, so nothing
	/// is recorded.
	pub fn convert_current(&self, store: &Keyspace, count: i64) -> Result<bool> {
		let Some(identity) = vantage_primitives::identity::current() else {
			return Ok(false);
		};
		match self {
			Self::AbTest(test) => test.convert(store, &identity, count),
		}
	}
}

impl Definition for Experiment {
	const KIND: RegistryKind = RegistryKind::Experiment;
	const TAGS: &'static [&'static str] = ExperimentKind::TAGS;

	fn id(&self) -> &Identifier {
		match self {
			Self::AbTest(test) => &test.id,
		}
	}

	fn name(&self) -> &str {
		match self {
			Self::AbTest(test) => &test.name,
		}
	}

	fn build(script: DefinitionScript, cx: &mut LoadContext<'_, '_, Self>) -> Result<Self> {
		let origin = cx.path().display().to_string();
		let kind: ExperimentKind = script.tag.parse().map_err(|_| RegistryError::UnknownKind {
			kind: RegistryKind::Experiment,
			path: cx.path().to_path_buf(),
			expected: ExperimentKind::TAGS.to_vec(),
		})?;

		let mut builder = ExperimentBuilder::new(kind, script.name, origin);
		builder.apply(script.fields, |name| cx.metric(name))?;
		builder.build()
	}

	fn save(&self, store: &Keyspace) -> Result<()> {
		match self {
			Self::AbTest(test) => test.save(store),
		}
	}
}

impl LoadContext<'_, '_, Experiment> {
	/// Resolves a metric, populating the metric registry within this pass.
	pub fn metric(&mut self, name: &str) -> Result<Arc<Metric>> {
		let env = self.env;
		env.metrics.get_in(name, env, self.scope)
	}
}
