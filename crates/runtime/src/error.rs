//! Error types for the bridge runtime.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the embedded player.
#[derive(Debug, Error)]
pub enum Error {
	/// No live embedded context to post to.
	#[error("Missing embedded context: unable to send message to the player document")]
	TransportAbsent,

	/// The transport refused the message.
	#[error("Transport error: {0}")]
	TransportError(String),

	/// Inbound envelope could not be understood.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// The readiness notification did not carry a usable method list.
	#[error("Invalid ready payload: {0}")]
	InvalidReadyPayload(String),

	/// The embedded player rejected the call; carries its error payload verbatim.
	#[error("Remote error: {0}")]
	Remote(Value),

	/// No result arrived within the configured call timeout.
	#[error("Timeout: no result for '{method}' (id={id}) after {}ms", .after.as_millis())]
	Timeout {
		method: String,
		id: u64,
		after: Duration,
	},

	/// No event of the awaited kind arrived in time.
	#[error("Timeout: no '{kind}' event after {}ms", .after.as_millis())]
	EventTimeout { kind: String, after: Duration },

	/// The embedded context was torn down while the call was pending.
	#[error("Embedded context destroyed before the call completed")]
	ContextDestroyed,

	/// The completion handle was dropped without a settlement.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns the remote error payload if the player rejected the call.
	pub fn remote_payload(&self) -> Option<&Value> {
		match self {
			Error::Remote(payload) => Some(payload),
			_ => None,
		}
	}

	pub fn is_remote(&self) -> bool {
		matches!(self, Error::Remote(_))
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout { .. } | Error::EventTimeout { .. })
	}

	/// Returns true if the call failed because the embedded context went away.
	pub fn is_context_lost(&self) -> bool {
		matches!(
			self,
			Error::TransportAbsent | Error::ContextDestroyed | Error::ChannelClosed
		)
	}
}
