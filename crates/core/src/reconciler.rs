//! Convergence of the embedded player toward host-declared state.
//!
//! The host declares a [`PlayerTarget`]. On each trigger the [`Reconciler`]
//! compares it with what it last applied and plans the player calls needed to
//! converge. Planned commands count as applied only once the bridge confirms
//! they were posted; a video id change that needs no call is recorded at once.
//!
//! Trigger rules:
//!
//! - playback inputs (playing, muted, volume, rate) or readiness changed, or a
//!   playback value was never confirmed:
//!   `playVideo`/`pauseVideo` and `mute`/`unMute` only when they differ from the
//!   applied value; `setVolume` and `setPlaybackRate` always
//! - video id differs from the applied one: recorded, and loaded only when
//!   configured to
//! - playlist differs structurally from the applied one: `loadPlaylist` when
//!   playing, `cuePlaylist` otherwise

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ytb_protocol::Playlist;
use ytb_protocol::methods;

/// Host-declared player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerTarget {
	#[serde(alias = "play")]
	pub playing: bool,
	#[serde(alias = "mute")]
	pub muted: bool,
	/// 0..=100
	pub volume: u8,
	pub playback_rate: f64,
	pub video_id: Option<String>,
	pub play_list: Option<Playlist>,
	pub play_list_start_index: u32,
}

impl Default for PlayerTarget {
	fn default() -> Self {
		Self {
			playing: false,
			muted: false,
			volume: 100,
			playback_rate: 1.0,
			video_id: None,
			play_list: None,
			play_list_start_index: 0,
		}
	}
}

impl PlayerTarget {
	fn playback_differs(&self, other: &Self) -> bool {
		self.playing != other.playing
			|| self.muted != other.muted
			|| self.volume != other.volume
			|| self.playback_rate != other.playback_rate
	}
}

/// Values last sent to the player. `None` means never applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedSnapshot {
	pub playing: Option<bool>,
	pub muted: Option<bool>,
	pub volume: Option<u8>,
	pub playback_rate: Option<f64>,
	pub video_id: Option<String>,
	pub playlist: Option<Playlist>,
}

/// One planned player call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
	pub method: &'static str,
	pub args: Vec<Value>,
	effect: Effect,
}

/// Snapshot field a command sets once it reaches the player.
#[derive(Debug, Clone, PartialEq)]
enum Effect {
	Playing(bool),
	Muted(bool),
	Volume(u8),
	PlaybackRate(f64),
	VideoId(String),
	Playlist(Playlist),
}

impl PlayerCommand {
	fn new(method: &'static str, args: Vec<Value>, effect: Effect) -> Self {
		Self { method, args, effect }
	}
}

/// Tracks applied state and plans convergence commands.
///
/// Planned commands change nothing until [`Reconciler::confirm`] reports them
/// sent, so a command that never reached the player is planned again on the
/// next trigger.
#[derive(Debug, Clone)]
pub struct Reconciler {
	applied: AppliedSnapshot,
	/// Target seen by the previous trigger; `None` right after readiness.
	last_seen: Option<PlayerTarget>,
	load_on_video_change: bool,
}

impl Reconciler {
	/// Seeds the snapshot with the video and playlist the document was loaded
	/// with, so they are not sent again on readiness.
	pub fn new(initial: &PlayerTarget, load_on_video_change: bool) -> Self {
		Self {
			applied: AppliedSnapshot {
				video_id: initial.video_id.clone(),
				playlist: initial.play_list.clone(),
				..AppliedSnapshot::default()
			},
			last_seen: None,
			load_on_video_change,
		}
	}

	pub fn applied(&self) -> &AppliedSnapshot {
		&self.applied
	}

	/// Plans the calls that converge the player to `target`.
	pub fn plan(&mut self, target: &PlayerTarget) -> Vec<PlayerCommand> {
		let mut commands = Vec::new();

		let playback_triggered = self
			.last_seen
			.as_ref()
			.is_none_or(|previous| previous.playback_differs(target))
			|| !self.playback_applied(target);

		if playback_triggered {
			self.plan_playback(target, &mut commands);
		}
		self.plan_video(target, &mut commands);
		self.plan_playlist(target, &mut commands);

		self.last_seen = Some(target.clone());
		commands
	}

	/// Records a planned command as sent to the player.
	pub fn confirm(&mut self, command: &PlayerCommand) {
		let applied = &mut self.applied;
		match &command.effect {
			Effect::Playing(playing) => applied.playing = Some(*playing),
			Effect::Muted(muted) => applied.muted = Some(*muted),
			Effect::Volume(volume) => applied.volume = Some(*volume),
			Effect::PlaybackRate(rate) => applied.playback_rate = Some(*rate),
			Effect::VideoId(video_id) => applied.video_id = Some(video_id.clone()),
			Effect::Playlist(playlist) => applied.playlist = Some(playlist.clone()),
		}
	}

	fn playback_applied(&self, target: &PlayerTarget) -> bool {
		self.applied.playing == Some(target.playing)
			&& self.applied.muted == Some(target.muted)
			&& self.applied.volume == Some(target.volume)
			&& self.applied.playback_rate == Some(target.playback_rate)
	}

	fn plan_playback(&self, target: &PlayerTarget, commands: &mut Vec<PlayerCommand>) {
		if self.applied.playing != Some(target.playing) {
			let method = if target.playing {
				methods::PLAY_VIDEO
			} else {
				methods::PAUSE_VIDEO
			};
			commands.push(PlayerCommand::new(method, vec![], Effect::Playing(target.playing)));
		}

		if self.applied.muted != Some(target.muted) {
			let method = if target.muted {
				methods::MUTE
			} else {
				methods::UN_MUTE
			};
			commands.push(PlayerCommand::new(method, vec![], Effect::Muted(target.muted)));
		}

		commands.push(PlayerCommand::new(
			methods::SET_VOLUME,
			vec![json!(target.volume)],
			Effect::Volume(target.volume),
		));
		commands.push(PlayerCommand::new(
			methods::SET_PLAYBACK_RATE,
			vec![json!(target.playback_rate)],
			Effect::PlaybackRate(target.playback_rate),
		));
	}

	fn plan_video(&mut self, target: &PlayerTarget, commands: &mut Vec<PlayerCommand>) {
		if self.applied.video_id == target.video_id {
			return;
		}

		match (&target.video_id, self.load_on_video_change) {
			(Some(video_id), true) => {
				let method = if target.playing {
					methods::LOAD_VIDEO_BY_ID
				} else {
					methods::CUE_VIDEO_BY_ID
				};
				commands.push(PlayerCommand::new(
					method,
					vec![json!(video_id)],
					Effect::VideoId(video_id.clone()),
				));
			}
			_ => {
				tracing::debug!(video_id = ?target.video_id, "Video id changed, no load issued");
				self.applied.video_id = target.video_id.clone();
			}
		}
	}

	fn plan_playlist(&self, target: &PlayerTarget, commands: &mut Vec<PlayerCommand>) {
		let Some(playlist) = &target.play_list else {
			return;
		};
		if self.applied.playlist.as_ref() == Some(playlist) {
			return;
		}

		let method = if target.playing {
			methods::LOAD_PLAYLIST
		} else {
			methods::CUE_PLAYLIST
		};
		let request = playlist.request(target.play_list_start_index);
		commands.push(PlayerCommand::new(
			method,
			vec![json!(request)],
			Effect::Playlist(playlist.clone()),
		));
	}

	/// Forgets playback state after the document went away. The video and
	/// playlist stay applied: a reloaded document is built from them.
	pub fn reset(&mut self) {
		self.applied = AppliedSnapshot {
			video_id: self.applied.video_id.take(),
			playlist: self.applied.playlist.take(),
			..AppliedSnapshot::default()
		};
		self.last_seen = None;
	}
}
