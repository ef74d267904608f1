//! Player-level payload types and code translation tables.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Player method names the bridge issues on its own.
pub mod methods {
	pub const PLAY_VIDEO: &str = "playVideo";
	pub const PAUSE_VIDEO: &str = "pauseVideo";
	pub const MUTE: &str = "mute";
	pub const UN_MUTE: &str = "unMute";
	pub const SET_VOLUME: &str = "setVolume";
	pub const SET_PLAYBACK_RATE: &str = "setPlaybackRate";
	pub const LOAD_PLAYLIST: &str = "loadPlaylist";
	pub const CUE_PLAYLIST: &str = "cuePlaylist";
	pub const LOAD_VIDEO_BY_ID: &str = "loadVideoById";
	pub const CUE_VIDEO_BY_ID: &str = "cueVideoById";
}

/// Named playback state, translated from the embedded player's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
	Unstarted,
	Ended,
	Playing,
	Paused,
	Buffering,
	VideoCued,
	Unknown(i64),
}

impl PlayerState {
	pub fn from_code(code: i64) -> Self {
		match code {
			-1 => Self::Unstarted,
			0 => Self::Ended,
			1 => Self::Playing,
			2 => Self::Paused,
			3 => Self::Buffering,
			5 => Self::VideoCued,
			other => Self::Unknown(other),
		}
	}

	/// Stable name handed to host callbacks.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Unstarted => "unstarted",
			Self::Ended => "ended",
			Self::Playing => "playing",
			Self::Paused => "paused",
			Self::Buffering => "buffering",
			Self::VideoCued => "video cued",
			Self::Unknown(_) => "unknown",
		}
	}
}

impl fmt::Display for PlayerState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unknown(code) => write!(f, "unknown({code})"),
			other => f.write_str(other.as_str()),
		}
	}
}

/// Player error, translated from the embedded player's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerError {
	InvalidParameter,
	Html5Error,
	VideoNotFound,
	/// Both 101 and 150 mean the owner disallows embedded playback.
	EmbedNotAllowed,
	Unknown(i64),
}

impl PlayerError {
	pub fn from_code(code: i64) -> Self {
		match code {
			2 => Self::InvalidParameter,
			5 => Self::Html5Error,
			100 => Self::VideoNotFound,
			101 | 150 => Self::EmbedNotAllowed,
			other => Self::Unknown(other),
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InvalidParameter => "invalid_parameter",
			Self::Html5Error => "HTML5_error",
			Self::VideoNotFound => "video_not_found",
			Self::EmbedNotAllowed => "embed_not_allowed",
			Self::Unknown(_) => "unknown",
		}
	}
}

impl fmt::Display for PlayerError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unknown(code) => write!(f, "unknown({code})"),
			other => f.write_str(other.as_str()),
		}
	}
}

/// Severity of a forwarded console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
	Debug,
	#[default]
	#[serde(alias = "log")]
	Info,
	Warn,
	Error,
	/// Anything else the embedded console emits (`trace`, `table`, ...).
	#[serde(other)]
	Other,
}

/// A console call made inside the embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleRecord {
	#[serde(rename = "type", alias = "level", default)]
	pub level: ConsoleLevel,
	#[serde(rename = "log", default)]
	pub args: Vec<Value>,
}

impl ConsoleRecord {
	/// Joins the console arguments the way a browser console prints them.
	pub fn line(&self) -> String {
		self.args
			.iter()
			.map(|arg| match arg {
				Value::String(s) => s.clone(),
				other => other.to_string(),
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Data of a `ready` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
	pub supported_api_methods: Vec<String>,
}

impl ReadyPayload {
	/// Validates `ready` data: `supportedApiMethods` must be an array of strings.
	pub fn from_data(data: &Value) -> Result<Self, String> {
		let methods = data
			.get("supportedApiMethods")
			.ok_or("ready data has no supportedApiMethods")?
			.as_array()
			.ok_or("supportedApiMethods must be an array")?;

		let supported_api_methods = methods
			.iter()
			.map(|m| {
				m.as_str()
					.map(str::to_string)
					.ok_or_else(|| format!("supportedApiMethods entry is not a string: {m}"))
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			supported_api_methods,
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn state_names() {
		assert_eq!(PlayerState::from_code(-1).as_str(), "unstarted");
		assert_eq!(PlayerState::from_code(5).to_string(), "video cued");
		assert_eq!(PlayerState::from_code(4), PlayerState::Unknown(4));
		assert_eq!(PlayerState::from_code(4).to_string(), "unknown(4)");
	}

	#[test]
	fn error_codes_fold_embed_restrictions() {
		assert_eq!(PlayerError::from_code(101), PlayerError::EmbedNotAllowed);
		assert_eq!(PlayerError::from_code(150), PlayerError::EmbedNotAllowed);
		assert_eq!(PlayerError::from_code(5).as_str(), "HTML5_error");
	}

	#[test]
	fn unknown_console_level_is_other() {
		let record: ConsoleRecord = serde_json::from_value(json!({"type": "table", "log": []})).unwrap();
		assert_eq!(record.level, ConsoleLevel::Other);

		let record: ConsoleRecord = serde_json::from_value(json!({"type": "log", "log": ["x"]})).unwrap();
		assert_eq!(record.level, ConsoleLevel::Info);
	}

	#[test]
	fn ready_payload_validation() {
		let ok = ReadyPayload::from_data(&json!({"supportedApiMethods": ["playVideo", "pauseVideo"]})).unwrap();
		assert_eq!(ok.supported_api_methods, vec!["playVideo", "pauseVideo"]);

		assert!(ReadyPayload::from_data(&json!({"supportedApiMethods": "playVideo"})).is_err());
		assert!(ReadyPayload::from_data(&json!({"supportedApiMethods": [1, 2]})).is_err());
		assert!(ReadyPayload::from_data(&Value::Null).is_err());
	}
}
