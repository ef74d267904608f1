//! Transport adapter between the host and the embedded document.
//!
//! The embedded context is reachable only through a one-directional
//! `postMessage(string)` primitive. [`Transport`] is that primitive; the view
//! layer that owns the document implements it. Inbound traffic goes the other way
//! through [`decode`], fed by whatever the view layer receives.

use tokio::sync::mpsc;
use ytb_protocol::{InboundEnvelope, OutboundEnvelope};

use crate::error::{Error, Result};

/// Outbound half of the channel to the embedded document.
pub trait Transport: Send + Sync {
	/// Posts one serialized envelope to the embedded document.
	fn post_message(&self, message: String) -> Result<()>;
}

/// [`Transport`] backed by an unbounded channel.
///
/// The receiving half yields each posted message in send order. Hosts that pump
/// messages from their own event loop, and tests, use this.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
	tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
	pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}
}

impl Transport for ChannelTransport {
	fn post_message(&self, message: String) -> Result<()> {
		self.tx
			.send(message)
			.map_err(|_| Error::TransportError("embedded document channel closed".to_string()))
	}
}

/// Serializes an outbound envelope to its transport string.
pub fn encode(envelope: &OutboundEnvelope) -> Result<String> {
	Ok(serde_json::to_string(envelope)?)
}

/// Parses a raw inbound message into a typed envelope.
pub fn decode(raw: &str) -> Result<InboundEnvelope> {
	serde_json::from_str(raw).map_err(|e| Error::ProtocolError(format!("malformed envelope: {e}")))
}

#[cfg(test)]
mod tests;
