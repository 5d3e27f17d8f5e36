//! `vantage` command-line tool.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use vantage::{Options, Playground};

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let playground = open_playground(&cli)?;
	let stdout = std::io::stdout();
	commands::run(&playground, cli.command, &mut stdout.lock())
}

fn open_playground(cli: &Cli) -> Result<Playground> {
	let mut options = match &cli.config {
		Some(path) => Options::from_file(path)?,
		None => Options::default(),
	};
	if let Some(dir) = &cli.load_path {
		options.load_path = Some(dir.clone());
	}
	tracing::debug!(?options, "opening playground");

	let playground = Playground::configure(options)?;
	if cli.mock {
		playground.use_mock();
	}
	Ok(playground)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("VANTAGE_LOG")
		.unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
