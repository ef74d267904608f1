//! Host callback set.
//!
//! Every callback is optional; an unset callback is a no-op. Payloads are the
//! translated forms from `ytb-protocol`, never raw envelope data.

use std::sync::Arc;

use ytb_protocol::{PlayerError, PlayerState};

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callbacks the bridge invokes on lifecycle notifications.
#[derive(Clone, Default)]
pub struct PlayerCallbacks {
	on_ready: Option<Arc<dyn Fn() + Send + Sync>>,
	on_error: Option<Callback<PlayerError>>,
	on_change_state: Option<Callback<PlayerState>>,
	on_playback_quality_change: Option<Callback<String>>,
	on_playback_rate_change: Option<Callback<f64>>,
	on_full_screen_change: Option<Callback<bool>>,
}

impl PlayerCallbacks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Called once the player declared its methods and the controller is usable.
	pub fn on_ready(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_ready = Some(Arc::new(f));
		self
	}

	pub fn on_error(mut self, f: impl Fn(PlayerError) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(f));
		self
	}

	pub fn on_change_state(mut self, f: impl Fn(PlayerState) + Send + Sync + 'static) -> Self {
		self.on_change_state = Some(Arc::new(f));
		self
	}

	pub fn on_playback_quality_change(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
		self.on_playback_quality_change = Some(Arc::new(f));
		self
	}

	pub fn on_playback_rate_change(mut self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
		self.on_playback_rate_change = Some(Arc::new(f));
		self
	}

	pub fn on_full_screen_change(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
		self.on_full_screen_change = Some(Arc::new(f));
		self
	}

	pub(crate) fn ready(&self) {
		if let Some(f) = &self.on_ready {
			f();
		}
	}

	pub(crate) fn error(&self, error: PlayerError) {
		if let Some(f) = &self.on_error {
			f(error);
		}
	}

	pub(crate) fn change_state(&self, state: PlayerState) {
		if let Some(f) = &self.on_change_state {
			f(state);
		}
	}

	pub(crate) fn playback_quality_change(&self, quality: String) {
		if let Some(f) = &self.on_playback_quality_change {
			f(quality);
		}
	}

	pub(crate) fn playback_rate_change(&self, rate: f64) {
		if let Some(f) = &self.on_playback_rate_change {
			f(rate);
		}
	}

	pub(crate) fn full_screen_change(&self, full_screen: bool) {
		if let Some(f) = &self.on_full_screen_change {
			f(full_screen);
		}
	}
}

impl std::fmt::Debug for PlayerCallbacks {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PlayerCallbacks")
			.field("on_ready", &self.on_ready.is_some())
			.field("on_error", &self.on_error.is_some())
			.field("on_change_state", &self.on_change_state.is_some())
			.field("on_playback_quality_change", &self.on_playback_quality_change.is_some())
			.field("on_playback_rate_change", &self.on_playback_rate_change.is_some())
			.field("on_full_screen_change", &self.on_full_screen_change.is_some())
			.finish()
	}
}
