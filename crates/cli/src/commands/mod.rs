mod config;
mod replay;
mod should_load;

use std::path::Path;

use anyhow::Context;
use ytb::BridgeConfig;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let Cli {
		verbose: _,
		config,
		command,
	} = cli;

	let config = match config {
		Some(path) => load_config(&path)?,
		None => BridgeConfig::default(),
	};

	match command {
		Commands::Replay(args) => replay::execute(args, config).await,
		Commands::ShouldLoad(args) => should_load::execute(args, config),
		Commands::Config => config::execute(&config),
	}
}

fn load_config(path: &Path) -> Result<BridgeConfig> {
	let raw = std::fs::read_to_string(path).map_err(|source| CliError::Input {
		path: path.to_path_buf(),
		source,
	})?;
	BridgeConfig::from_json(&raw).map_err(|source| CliError::Config {
		path: path.to_path_buf(),
		source,
	})
}

/// Reads `path`, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
	if path == Path::new("-") {
		let raw = std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?;
		return Ok(raw);
	}
	std::fs::read_to_string(path).map_err(|source| CliError::Input {
		path: path.to_path_buf(),
		source,
	})
}
