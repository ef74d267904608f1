use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ytb::{Platform, PlayerTarget, Playlist};

#[derive(Parser, Debug)]
#[command(name = "ytb")]
#[command(about = "Drive the embedded player bridge from recorded or scripted messages")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Bridge configuration file (JSON)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Feed inbound envelopes through a bridge and print what it does
	Replay(ReplayArgs),

	/// Ask the navigation policy whether a URL may load
	ShouldLoad(ShouldLoadArgs),

	/// Print the effective configuration
	Config,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
	/// Inbound messages, one JSON envelope per line ("-" for stdin)
	#[arg(value_name = "FILE", default_value = "-")]
	pub input: PathBuf,

	/// Answer every outbound call with a null result
	#[arg(long)]
	pub auto_ack: bool,

	#[command(flatten)]
	pub target: TargetArgs,

	/// Target to apply after the input is replayed (JSON, repeatable)
	#[arg(long = "then", value_name = "JSON")]
	pub then: Vec<String>,
}

/// Initial player target.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
	#[arg(long)]
	pub play: bool,

	#[arg(long)]
	pub mute: bool,

	#[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
	pub volume: u8,

	#[arg(long, default_value_t = 1.0)]
	pub rate: f64,

	#[arg(long, value_name = "ID")]
	pub video_id: Option<String>,

	/// Comma separated video ids
	#[arg(long, value_name = "IDS", value_delimiter = ',', conflicts_with = "playlist_id")]
	pub playlist: Option<Vec<String>>,

	#[arg(long, value_name = "ID")]
	pub playlist_id: Option<String>,

	#[arg(long, default_value_t = 0)]
	pub start_index: u32,
}

impl TargetArgs {
	pub fn to_target(&self) -> PlayerTarget {
		let play_list = match (&self.playlist, &self.playlist_id) {
			(Some(videos), _) => Some(Playlist::Videos(videos.clone())),
			(None, Some(id)) => Some(Playlist::Id(id.clone())),
			(None, None) => None,
		};

		PlayerTarget {
			playing: self.play,
			muted: self.mute,
			volume: self.volume,
			playback_rate: self.rate,
			video_id: self.video_id.clone(),
			play_list,
			play_list_start_index: self.start_index,
		}
	}
}

#[derive(Args, Debug)]
pub struct ShouldLoadArgs {
	pub url: String,

	/// Top-level document URL of the request
	#[arg(long, value_name = "URL")]
	pub main_document_url: Option<String>,

	/// Overrides the configured platform
	#[arg(long, value_enum)]
	pub platform: Option<CliPlatform>,
}

/// Platform (CLI wrapper for ytb::Platform)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliPlatform {
	Ios,
	Android,
	Other,
}

impl From<CliPlatform> for Platform {
	fn from(platform: CliPlatform) -> Self {
		match platform {
			CliPlatform::Ios => Platform::Ios,
			CliPlatform::Android => Platform::Android,
			CliPlatform::Other => Platform::Other,
		}
	}
}
