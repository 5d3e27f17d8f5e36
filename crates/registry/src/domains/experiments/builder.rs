use std::fmt;
use std::sync::Arc;

use toml::Value;
use vantage_primitives::Identifier;

use super::{AbTest, Experiment, ExperimentKind};
use crate::core::{Definition, Fields};
use crate::metrics::Metric;
use crate::{RegistryError, Result};

/// One value an experiment can hand out.
#[derive(Debug, Clone, PartialEq)]
pub enum AlternativeValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
}

impl AlternativeValue {
	fn from_toml(value: Value) -> Option<Self> {
		match value {
			Value::Boolean(b) => Some(Self::Bool(b)),
			Value::Integer(i) => Some(Self::Int(i)),
			Value::Float(f) => Some(Self::Float(f)),
			Value::String(s) => Some(Self::Text(s)),
			_ => None,
		}
	}
}

impl fmt::Display for AlternativeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => b.fmt(f),
			Self::Int(i) => i.fmt(f),
			Self::Float(x) => x.fmt(f),
			Self::Text(s) => s.fmt(f),
		}
	}
}

impl From<bool> for AlternativeValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for AlternativeValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<&str> for AlternativeValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

/// Collects the body of an experiment definition.
///
/// Definition files feed it through [`apply`](Self::apply); programmatic
/// definitions call the setters directly.
#[derive(Debug)]
pub struct ExperimentBuilder {
	kind: ExperimentKind,
	name: String,
	origin: String,
	description: Option<String>,
	alternatives: Option<Vec<AlternativeValue>>,
	metrics: Vec<Arc<Metric>>,
}

impl ExperimentBuilder {
	/// `origin` names the definition in error messages.
	pub fn new(kind: ExperimentKind, name: impl Into<String>, origin: impl Into<String>) -> Self {
		Self {
			kind,
			name: name.into(),
			origin: origin.into(),
			description: None,
			alternatives: None,
			metrics: Vec::new(),
		}
	}

	pub fn id(&self) -> Identifier {
		Identifier::normalize(&self.name)
	}

	pub fn description(&mut self, text: impl Into<String>) -> &mut Self {
		self.description = Some(text.into());
		self
	}

	pub fn alternatives<I, V>(&mut self, values: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: Into<AlternativeValue>,
	{
		self.alternatives = Some(values.into_iter().map(Into::into).collect());
		self
	}

	pub fn metric(&mut self, metric: Arc<Metric>) -> &mut Self {
		if !self.metrics.iter().any(|known| known.id() == metric.id()) {
			self.metrics.push(metric);
		}
		self
	}

	/// Runs one builder call per body key. Metric names go through
	/// `resolve_metric`.
	pub fn apply(&mut self, mut fields: Fields, mut resolve_metric: impl FnMut(&str) -> Result<Arc<Metric>>) -> Result<&mut Self> {
		if let Some(text) = fields.take_str("description")? {
			self.description(text);
		}

		if let Some(values) = fields.take_array("alternatives")? {
			let mut alternatives = Vec::with_capacity(values.len());
			for value in values {
				let alternative = AlternativeValue::from_toml(value)
					.ok_or_else(|| fields.invalid("alternatives", "booleans, numbers or strings"))?;
				alternatives.push(alternative);
			}
			self.alternatives = Some(alternatives);
		}

		for name in fields.take_str_list("metrics")?.unwrap_or_default() {
			let metric = resolve_metric(&name)?;
			self.metric(metric);
		}

		fields.finish()?;
		Ok(self)
	}

	pub fn build(self) -> Result<Experiment> {
		let alternatives = self
			.alternatives
			.unwrap_or_else(|| vec![AlternativeValue::Bool(false), AlternativeValue::Bool(true)]);
		if alternatives.len() < 2 {
			return Err(RegistryError::InvalidField {
				origin: self.origin,
				field: "alternatives".to_owned(),
				expected: "at least two alternatives",
			});
		}

		match self.kind {
			ExperimentKind::AbTest => Ok(Experiment::AbTest(AbTest::new(
				self.name,
				self.description,
				alternatives,
				self.metrics,
			))),
		}
	}
}
