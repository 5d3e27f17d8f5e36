//! Subcommand implementations. Output goes to the given writer.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Days, Utc};
use vantage::{Definition, MetricKind, Playground, identity};

use crate::cli::Command;


pub fn run(playground: &Playground, command: Command, out: &mut impl Write) -> Result<()> {
	match command {
		Command::List => list(playground, out),
		Command::Show { experiment } => show(playground, &experiment, out),
		Command::Track { metric, count, identity } => track(playground, &metric, count, identity, out),
		Command::Values { metric, days } => values(playground, &metric, days, out),
	}
}

fn list(playground: &Playground, out: &mut impl Write) -> Result<()> {
	let experiments = playground.experiments()?;
	writeln!(out, "experiments ({})", experiments.len())?;
	for (id, experiment) in experiments.iter() {
		writeln!(out, "  {:<24} {:<8} {}", id.as_str(), experiment.kind().to_string(), experiment.name())?;
	}

	let metrics = playground.metrics()?;
	writeln!(out, "metrics ({})", metrics.len())?;
	for (id, metric) in metrics.iter() {
		let kind = match metric.kind() {
			MetricKind::Counter => "counter",
			MetricKind::Sum(_) => "sum",
		};
		writeln!(out, "  {:<24} {kind:<8} {}", id.as_str(), metric.name())?;
	}
	Ok(())
}

fn show(playground: &Playground, name: &str, out: &mut impl Write) -> Result<()> {
	let experiment = playground.experiment(name)?;
	let store = playground.connection()?;

	writeln!(out, "{} ({}, {})", experiment.name(), experiment.id(), experiment.kind())?;
	if let Some(description) = experiment.description() {
		writeln!(out, "  {description}")?;
	}
	if !experiment.metrics().is_empty() {
		let ids: Vec<&str> = experiment.metrics().iter().map(|m| m.id().as_str()).collect();
		writeln!(out, "  metrics: {}", ids.join(", "))?;
	}

	let Some(test) = experiment.as_ab_test() else {
		return Ok(());
	};
	match test.outcome(&store)? {
		Some(outcome) => writeln!(out, "  completed: outcome is alternative {outcome}")?,
		None => writeln!(out, "  active")?,
	}
	for row in test.report(&store)? {
		writeln!(
			out,
			"  [{}] {:<12} participants {:>6}  conversions {:>6}  rate {:>5.1}%",
			row.index,
			row.value.to_string(),
			row.participants,
			row.conversions,
			row.conversion_rate() * 100.0
		)?;
	}
	Ok(())
}

fn track(playground: &Playground, metric: &str, count: i64, who: Option<String>, out: &mut impl Write) -> Result<()> {
	match who {
		Some(who) => identity::scope(who, || playground.track(metric, count))?,
		None => playground.track(metric, count)?,
	}
	if playground.is_collecting() {
		writeln!(out, "tracked {count} on {metric}")?;
	} else {
		writeln!(out, "collection is disabled; nothing recorded for {metric}")?;
	}
	Ok(())
}

fn values(playground: &Playground, name: &str, days: u32, out: &mut impl Write) -> Result<()> {
	let metric = playground.metric(name)?;
	let store = playground.connection()?;

	let to = Utc::now().date_naive();
	let from = to
		.checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
		.context("date range starts before the calendar does")?;
	for (day, count) in metric.values(&store, from, to)? {
		writeln!(out, "{day}  {count}")?;
	}
	Ok(())
}
