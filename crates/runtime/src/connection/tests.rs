use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use super::*;
use crate::transport::ChannelTransport;

fn create_test_connection() -> (Connection, mpsc::UnboundedReceiver<String>) {
	let (transport, rx) = ChannelTransport::new();
	let connection = Connection::new(None);
	connection.attach(Arc::new(transport));
	(connection, rx)
}

fn sent(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
	serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
}

#[test]
fn test_request_id_increments() {
	let (connection, mut rx) = create_test_connection();

	let _a = connection.call("playVideo", vec![]);
	let _b = connection.call("pauseVideo", vec![]);
	let _c = connection.call("mute", vec![]);

	assert_eq!(sent(&mut rx)["id"], 0);
	assert_eq!(sent(&mut rx)["id"], 1);
	assert_eq!(sent(&mut rx)["id"], 2);
	assert_eq!(connection.pending_calls(), 3);
}

#[test]
fn test_request_format() {
	let (connection, mut rx) = create_test_connection();

	let _call = connection.call("seekTo", vec![json!(30), json!(true)]);

	assert_eq!(
		sent(&mut rx),
		json!({"kind": "call", "id": 0, "method": "seekTo", "args": [30, true]})
	);
}

#[tokio::test]
async fn test_complete_success() {
	let (connection, _rx) = create_test_connection();

	let call = connection.call("getVolume", vec![]);
	assert!(connection.complete(CallResult::resolved(call.id().unwrap(), json!(80))));

	assert_eq!(call.await.unwrap(), json!(80));
	assert_eq!(connection.pending_calls(), 0);
}

#[tokio::test]
async fn test_complete_remote_error() {
	let (connection, _rx) = create_test_connection();

	let call = connection.call("loadPlaylist", vec![]);
	connection.complete(CallResult::rejected(call.id().unwrap(), json!({"code": 2})));

	let err = call.await.unwrap_err();
	assert_eq!(err.remote_payload(), Some(&json!({"code": 2})));
}

#[tokio::test]
async fn test_out_of_order_completion() {
	let (connection, _rx) = create_test_connection();

	let a = connection.call("getCurrentTime", vec![]);
	let b = connection.call("getDuration", vec![]);

	connection.complete(CallResult::resolved(b.id().unwrap(), json!("b")));
	assert_eq!(b.await.unwrap(), json!("b"));
	assert_eq!(connection.pending_calls(), 1);

	connection.complete(CallResult::resolved(a.id().unwrap(), json!("a")));
	assert_eq!(a.await.unwrap(), json!("a"));
}

#[tokio::test]
async fn test_unknown_id_is_ignored() {
	let (connection, _rx) = create_test_connection();

	let call = connection.call("getVolume", vec![]);
	assert!(!connection.complete(CallResult::resolved(999, json!(1))));
	assert_eq!(connection.pending_calls(), 1);

	connection.complete(CallResult::resolved(call.id().unwrap(), json!(2)));
	assert_eq!(call.await.unwrap(), json!(2));
}

#[tokio::test]
async fn test_missing_transport_rejects() {
	let connection = Connection::new(None);

	let err = connection.call("playVideo", vec![]).await.unwrap_err();
	assert!(matches!(err, Error::TransportAbsent), "got {err:?}");
	assert_eq!(connection.pending_calls(), 0);
}

#[tokio::test]
async fn test_closed_transport_rejects() {
	let (connection, rx) = create_test_connection();
	drop(rx);

	let call = connection.call("playVideo", vec![]);
	assert!(!call.is_posted());

	let err = call.await.unwrap_err();
	assert!(matches!(err, Error::TransportError(_)), "got {err:?}");
	assert_eq!(connection.pending_calls(), 0);
}

#[tokio::test]
async fn test_detach_fails_pending() {
	let (connection, _rx) = create_test_connection();

	let call = connection.call("getDuration", vec![]);
	assert_eq!(connection.detach(), 1);
	assert!(!connection.is_attached());

	assert!(matches!(call.await, Err(Error::ContextDestroyed)));
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout() {
	let (transport, _rx) = ChannelTransport::new();
	let connection = Connection::new(Some(std::time::Duration::from_secs(5)));
	connection.attach(Arc::new(transport));

	let call = connection.call("getPlaylist", vec![]);
	let id = call.id().unwrap();

	let err = call.await.unwrap_err();
	assert!(err.is_timeout(), "got {err:?}");
	assert!(!connection.complete(CallResult::resolved(id, json!([]))));
}

#[tokio::test(start_paused = true)]
async fn test_unawaited_call_expires() {
	let (transport, _rx) = ChannelTransport::new();
	let connection = Connection::new(Some(std::time::Duration::from_millis(100)));
	connection.attach(Arc::new(transport));

	let call = connection.call("getVideoLoadedFraction", vec![]);
	let id = call.id().unwrap();
	tokio::time::advance(std::time::Duration::from_secs(10)).await;

	assert_eq!(connection.pending_calls(), 0);
	assert!(!connection.complete(CallResult::resolved(id, json!(0.5))));
	assert!(call.await.unwrap_err().is_timeout());
}
