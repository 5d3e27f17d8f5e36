use std::path::PathBuf;

use clap::{Parser, Subcommand};


#[derive(Parser, Debug)]
#[command(name = "vantage")]
#[command(about = "Inspect experiments and track metrics")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (TOML)
	#[arg(long, short = 'c', value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,

	/// Directory holding definition files; overrides the configuration
	#[arg(long, value_name = "DIR", global = true)]
	pub load_path: Option<PathBuf>,

	/// Use in-memory storage instead of connecting
	#[arg(long, global = true)]
	pub mock: bool,

	/// Verbose logging
	#[arg(long, short, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
	/// List every experiment and metric
	List,
	/// Show an experiment's alternatives and results
	Show {
		/// Experiment name or identifier
		experiment: String,
	},
	/// Add to a metric
	Track {
		/// Metric name or identifier
		metric: String,
		/// Amount to add
		#[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
		count: i64,
		/// Identity to credit conversions to
		#[arg(long, short = 'i')]
		identity: Option<String>,
	},
	/// Print a metric's daily values
	Values {
		/// Metric name or identifier
		metric: String,
		/// Number of days up to and including today
		#[arg(long, short = 'd', default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
		days: u32,
	},
}
