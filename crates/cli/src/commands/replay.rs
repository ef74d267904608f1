use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use ytb::{Bridge, BridgeConfig, ChannelTransport, PlayerCallbacks, PlayerTarget};

use crate::cli::ReplayArgs;
use crate::error::{CliError, Result};
use crate::output::{Record, emit};

pub async fn execute(args: ReplayArgs, config: BridgeConfig) -> Result<()> {
	let input = super::read_input(&args.input)?;
	tracing::info!(input = %args.input.display(), auto_ack = args.auto_ack, "Replaying inbound messages");

	let bridge = Bridge::builder()
		.config(config)
		.callbacks(echo_callbacks())
		.target(args.target.to_target())
		.build();
	let _events = bridge.on_event(None, |event| {
		emit(&Record::Event {
			kind: &event.kind,
			data: event.data.clone(),
		})
	});

	let (transport, mut outbound) = ChannelTransport::new();
	bridge.attach(Arc::new(transport));

	for (index, line) in input.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		if let Err(e) = bridge.dispatch(line) {
			tracing::warn!(line = index + 1, error = %e, "Input line rejected");
			emit(&Record::Rejected {
				line: index + 1,
				error: e.to_string(),
			});
		}
		flush(&bridge, &mut outbound, args.auto_ack)?;
	}

	for patch in &args.then {
		let target = patch_target(&bridge.target(), patch)?;
		bridge.set_target(target);
		flush(&bridge, &mut outbound, args.auto_ack)?;
	}

	let controller = bridge.controller();
	emit(&Record::Summary {
		ready: bridge.is_ready(),
		supported_api_methods: controller.supported_api_methods().to_vec(),
		pending_calls: bridge.pending_calls(),
	});

	bridge.teardown();
	Ok(())
}

fn echo_callbacks() -> PlayerCallbacks {
	let callback = |name: &'static str, value: Value| emit(&Record::Callback { name, value });

	PlayerCallbacks::new()
		.on_ready(move || callback("onReady", Value::Null))
		.on_change_state(move |state| callback("onChangeState", json!(state.as_str())))
		.on_error(move |error| callback("onError", json!(error.as_str())))
		.on_playback_quality_change(move |quality| callback("onPlaybackQualityChange", json!(quality)))
		.on_playback_rate_change(move |rate| callback("onPlaybackRateChange", json!(rate)))
		.on_full_screen_change(move |full_screen| callback("onFullScreenChange", json!(full_screen)))
}

/// Prints queued outbound envelopes, answering calls when `auto_ack` is set.
fn flush(bridge: &Bridge, outbound: &mut mpsc::UnboundedReceiver<String>, auto_ack: bool) -> Result<()> {
	while let Ok(message) = outbound.try_recv() {
		let envelope: Value = serde_json::from_str(&message)?;
		let id = envelope.get("id").and_then(Value::as_u64);
		emit(&Record::Outbound { envelope });

		if let (true, Some(id)) = (auto_ack, id) {
			bridge.on_message(&json!({"kind": "call-result", "id": id, "result": null}).to_string());
		}
	}
	Ok(())
}

/// Applies a partial JSON target over `current`.
fn patch_target(current: &PlayerTarget, patch: &str) -> Result<PlayerTarget> {
	let Value::Object(patch) = serde_json::from_str::<Value>(patch)? else {
		return Err(CliError::Target(format!("expected a JSON object, got {patch}")));
	};

	let mut merged = serde_json::to_value(current)?;
	if let Value::Object(fields) = &mut merged {
		fields.extend(patch);
	}
	serde_json::from_value(merged).map_err(|e| CliError::Target(e.to_string()))
}

#[cfg(test)]
mod tests {
	use ytb::Playlist;

	use super::*;

	#[test]
	fn patch_keeps_unmentioned_fields() {
		let current = PlayerTarget {
			playing: true,
			volume: 30,
			..PlayerTarget::default()
		};

		let patched = patch_target(&current, r#"{"volume": 80, "playList": ["x", "y"]}"#).unwrap();

		assert!(patched.playing);
		assert_eq!(patched.volume, 80);
		assert_eq!(patched.play_list, Some(Playlist::Videos(vec!["x".into(), "y".into()])));
	}

	#[test]
	fn patch_must_be_object() {
		let err = patch_target(&PlayerTarget::default(), "[1, 2]").unwrap_err();
		assert!(matches!(err, CliError::Target(_)));
	}
}
