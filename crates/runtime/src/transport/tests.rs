use serde_json::json;
use ytb_protocol::{CallEnvelope, CallResult, PlayerState};

use super::*;

#[test]
fn test_encode_call_envelope() {
	let envelope = OutboundEnvelope::Call(CallEnvelope {
		id: 1,
		method: "setVolume".to_string(),
		args: vec![json!(40)],
	});

	let raw = encode(&envelope).unwrap();
	let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
	assert_eq!(parsed, json!({"kind": "call", "id": 1, "method": "setVolume", "args": [40]}));
}

#[test]
fn test_decode_call_result() {
	let envelope = decode(r#"{"kind": "call-result", "id": 9, "result": 12.5}"#).unwrap();
	assert_eq!(envelope, InboundEnvelope::CallResult(CallResult::resolved(9, json!(12.5))));
}

#[test]
fn test_decode_lifecycle() {
	let envelope = decode(r#"{"kind": "state-change", "data": 2}"#).unwrap();
	assert_eq!(envelope, InboundEnvelope::StateChange(PlayerState::Paused));
}

#[test]
fn test_decode_non_json_is_protocol_error() {
	let err = decode("not json at all").unwrap_err();
	assert!(matches!(err, Error::ProtocolError(_)), "got {err:?}");
	assert!(err.to_string().contains("malformed envelope"));
}

#[tokio::test]
async fn test_channel_transport_preserves_order() {
	let (transport, mut rx) = ChannelTransport::new();

	for i in 0..3 {
		transport.post_message(format!("m{i}")).unwrap();
	}

	assert_eq!(rx.recv().await.unwrap(), "m0");
	assert_eq!(rx.recv().await.unwrap(), "m1");
	assert_eq!(rx.recv().await.unwrap(), "m2");
}

#[test]
fn test_channel_transport_closed_receiver() {
	let (transport, rx) = ChannelTransport::new();
	drop(rx);

	let err = transport.post_message("late".to_string()).unwrap_err();
	assert!(matches!(err, Error::TransportError(_)), "got {err:?}");
}
