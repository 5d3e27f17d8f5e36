//! Metrics: named daily counters that experiments measure.
//!
//! ```toml
//! metric = "Signups"
//! description = "Accounts created"
//! ```
//!
//! A metric listing `sum_of` is derived from other metrics and cannot be
//! tracked directly.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use vantage_primitives::Identifier;
use vantage_storage::{Keyspace, StoreError};

use crate::core::{Definition, DefinitionScript, LoadContext, RegistryKind};
use crate::{RegistryError, Result};


/// Kind tags a metric file may declare.
pub const METRIC_KINDS: &[&str] = &["metric"];

/// What a metric counts.
#[derive(Debug, Clone)]
pub enum MetricKind {
	/// Incremented through [`Metric::track`].
	Counter,
	/// Elementwise sum of other metrics.
	Sum(Vec<Arc<Metric>>),
}

#[derive(Debug, Clone)]
pub struct Metric {
	id: Identifier,
	name: String,
	description: Option<String>,
	kind: MetricKind,
}

impl Metric {
	pub fn new(name: impl Into<String>, description: Option<String>, kind: MetricKind) -> Self {
		let name = name.into();
		Self {
			id: Identifier::normalize(&name),
			name,
			description,
			kind,
		}
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn kind(&self) -> &MetricKind {
		&self.kind
	}

	/// Whether [`track`](Self::track) accepts counts.
	pub fn trackable(&self) -> bool {
		matches!(self.kind, MetricKind::Counter)
	}

	fn key(&self, suffix: &str) -> String {
		format!("metrics:{}:{suffix}", self.id)
	}

	fn day_key(&self, day: NaiveDate) -> String {
		self.key(&format!("{day}:count"))
	}

	/// Adds `count` to the counter for the day of `at`; returns the day's total.
	pub fn track(&self, store: &Keyspace, count: i64, at: DateTime<Utc>) -> Result<i64> {
		if !self.trackable() {
			return Err(RegistryError::NotTrackable { id: self.id.clone() });
		}
		let total = store.incr_by(&self.day_key(at.date_naive()), count)?;
		store.set(&self.key("last_update_at"), &at.to_rfc3339())?;
		Ok(total)
	}

	/// Per-day counts for every day in `from..=to`, zero where nothing was tracked.
	pub fn values(&self, store: &Keyspace, from: NaiveDate, to: NaiveDate) -> Result<Vec<(NaiveDate, i64)>> {
		let days: Vec<NaiveDate> = from.iter_days().take_while(|day| *day <= to).collect();
		match &self.kind {
			MetricKind::Counter => {
				let keys: Vec<String> = days.iter().map(|day| self.day_key(*day)).collect();
				let raw = store.mget(&keys)?;
				keys.into_iter()
					.zip(raw)
					.zip(&days)
					.map(|((key, value), day)| Ok((*day, parse_count(key, value)?)))
					.collect()
			}
			MetricKind::Sum(parts) => {
				let mut totals: Vec<(NaiveDate, i64)> = days.iter().map(|day| (*day, 0)).collect();
				for part in parts {
					for (total, (_, value)) in totals.iter_mut().zip(part.values(store, from, to)?) {
						total.1 = total.1.saturating_add(value);
					}
				}
				Ok(totals)
			}
		}
	}

	/// When the metric was last tracked; for sums, the latest component update.
	pub fn last_update_at(&self, store: &Keyspace) -> Result<Option<DateTime<Utc>>> {
		match &self.kind {
			MetricKind::Counter => {
				let key = self.key("last_update_at");
				match store.get(&key)? {
					None => Ok(None),
					Some(value) => match DateTime::parse_from_rfc3339(&value) {
						Ok(at) => Ok(Some(at.with_timezone(&Utc))),
						Err(_) => Err(RegistryError::InvalidStoredValue { key, value }),
					},
				}
			}
			MetricKind::Sum(parts) => {
				let mut latest = None;
				for part in parts {
					latest = latest.max(part.last_update_at(store)?);
				}
				Ok(latest)
			}
		}
	}
}

fn parse_count(key: String, value: Option<String>) -> Result<i64> {
	match value {
		None => Ok(0),
		Some(value) => value
			.parse()
			.map_err(|_| RegistryError::from(StoreError::NotAnInteger { key, value })),
	}
}

impl Definition for Metric {
	const KIND: RegistryKind = RegistryKind::Metric;
	const TAGS: &'static [&'static str] = METRIC_KINDS;

	fn id(&self) -> &Identifier {
		&self.id
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn build(script: DefinitionScript, cx: &mut LoadContext<'_, '_, Self>) -> Result<Self> {
		let DefinitionScript { name, mut fields, .. } = script;
		let description = fields.take_str("description")?;
		let sum_of = fields.take_str_list("sum_of")?;
		fields.finish()?;

		let kind = match sum_of {
			None => MetricKind::Counter,
			Some(names) if names.is_empty() => {
				return Err(RegistryError::InvalidField {
					origin: cx.path().display().to_string(),
					field: "sum_of".to_owned(),
					expected: "a non-empty list of metric names",
				});
			}
			Some(names) => MetricKind::Sum(names.iter().map(|part| cx.require(part)).collect::<Result<_>>()?),
		};
		Ok(Self::new(name, description, kind))
	}

	fn save(&self, store: &Keyspace) -> Result<()> {
		store.set_nx(&self.key("created_at"), &Utc::now().to_rfc3339())?;
		Ok(())
	}
}
