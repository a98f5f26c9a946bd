//! Main entry point for the exchange signer CLI.
//!
//! `hl-sign` loads a wallet from configuration, signs actions read from JSON
//! files and prints the request body the exchange expects.

use clap::Parser;
use signer_config::Config;
use std::path::PathBuf;

mod commands;

use commands::Command;

/// Command-line arguments for the signer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// stdout carries the JSON output
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		network = %config.signer.network,
		wallet = %config.wallet.primary,
		"Loaded configuration"
	);

	let output = commands::run(args.command, &config).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}
