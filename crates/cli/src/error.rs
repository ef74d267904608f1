use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("failed to read {path}")]
	Input {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid configuration in {path}")]
	Config {
		path: PathBuf,
		#[source]
		source: ytb::Error,
	},

	#[error("invalid target: {0}")]
	Target(String),

	#[error(transparent)]
	Bridge(#[from] ytb::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}
