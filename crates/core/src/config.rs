//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Document the player is loaded from when the host does not override it.
pub const DEFAULT_BASE_URL: &str =
	"https://lonelycpp.github.io/react-native-youtube-iframe/iframe_v2.html";

/// Default bound on how long a player call may stay unanswered.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 15_000;

/// Host platform, consulted by the navigation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	Ios,
	Android,
	#[default]
	Other,
}

/// Settings for a [`Bridge`](crate::Bridge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
	/// Bound for every player call in milliseconds; `None` waits forever.
	pub call_timeout_ms: Option<u64>,
	/// Origin of the player document. Navigation elsewhere is refused.
	pub base_url: String,
	pub platform: Platform,
	/// Issue `loadVideoById`/`cueVideoById` when the target video id changes.
	pub load_on_video_change: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			call_timeout_ms: Some(DEFAULT_CALL_TIMEOUT_MS),
			base_url: DEFAULT_BASE_URL.to_string(),
			platform: Platform::default(),
			load_on_video_change: false,
		}
	}
}

impl BridgeConfig {
	/// Parses a JSON configuration, filling absent keys with defaults.
	pub fn from_json(raw: &str) -> ytb_runtime::Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn call_timeout(&self) -> Option<Duration> {
		self.call_timeout_ms.map(Duration::from_millis)
	}
}
