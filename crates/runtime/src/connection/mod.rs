//! Call layer between player method stubs and the transport.
//!
//! # Message Flow
//!
//! 1. A stub calls [`Connection::call`] with a method name and arguments
//! 2. Connection allocates an id and registers a pending entry
//! 3. A call envelope is serialized and posted to the embedded document
//! 4. The caller awaits the returned [`PendingCall`]
//! 5. The router hands each `call-result` envelope to [`Connection::complete`]
//! 6. The result is matched by id, never by arrival order, and settles the future

mod pending;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use ytb_protocol::{CallEnvelope, CallOutcome, CallResult, OutboundEnvelope};

pub use self::pending::{PendingCall, PendingCalls};
use crate::error::Error;
use crate::transport::{self, Transport};

/// What a remote method stub needs from the connection.
///
/// Stubs hold an `Arc<dyn CallSink>` so they stay independent of how calls
/// reach the embedded document.
pub trait CallSink: Send + Sync {
	/// Sends a call envelope and returns the future of its result.
	///
	/// The envelope is posted before this returns. Failures to post surface
	/// through the returned future, never as a panic.
	fn call(&self, method: &str, args: Vec<Value>) -> PendingCall;
}

/// Connection to one embedded document.
pub struct Connection {
	calls: Arc<PendingCalls>,
	transport: Mutex<Option<Arc<dyn Transport>>>,
	call_timeout: Option<Duration>,
}

impl Connection {
	/// Creates a detached connection. `call_timeout` bounds every call; `None`
	/// waits forever.
	pub fn new(call_timeout: Option<Duration>) -> Self {
		Self {
			calls: Arc::new(PendingCalls::new()),
			transport: Mutex::new(None),
			call_timeout,
		}
	}

	/// Installs the live channel to the embedded document.
	pub fn attach(&self, transport: Arc<dyn Transport>) {
		if self.transport.lock().replace(transport).is_some() {
			tracing::debug!("Replaced embedded document transport");
		}
	}

	/// Removes the channel and fails every pending call with [`Error::ContextDestroyed`].
	///
	/// Returns the number of calls that were failed.
	pub fn detach(&self) -> usize {
		self.transport.lock().take();
		let failed = self.calls.fail_all(|| Error::ContextDestroyed);
		if failed > 0 {
			tracing::debug!(failed, "Failed pending calls on detach");
		}
		failed
	}

	pub fn is_attached(&self) -> bool {
		self.transport.lock().is_some()
	}

	/// Number of calls still awaiting a result. Overdue calls are expired first.
	pub fn pending_calls(&self) -> usize {
		self.calls.expire();
		self.calls.len()
	}

	pub fn call_timeout(&self) -> Option<Duration> {
		self.call_timeout
	}

	/// Sends a call envelope and returns the future of its result.
	///
	/// A call that could not be posted comes back already failed, with no id.
	pub fn call(&self, method: &str, args: Vec<Value>) -> PendingCall {
		let Some(channel) = self.transport.lock().clone() else {
			tracing::error!(method, "Missing embedded context, unable to send player call");
			return PendingCall::failed(method, Error::TransportAbsent);
		};

		self.calls.expire();

		let id = self.calls.next_id();
		tracing::debug!(id, method, "Sending player call");

		let pending = self.calls.register(id, method, self.call_timeout);

		let envelope = OutboundEnvelope::Call(CallEnvelope {
			id,
			method: method.to_string(),
			args,
		});

		let sent = transport::encode(&envelope).and_then(|message| channel.post_message(message));
		match sent {
			Ok(()) => pending,
			Err(e) => {
				tracing::error!(id, method, error = %e, "Failed to post player call");
				self.calls.abandon(id);
				PendingCall::failed(method, e)
			}
		}
	}

	/// Settles the pending call a `call-result` envelope refers to.
	///
	/// Returns false for an unknown id; late and duplicate results are ignored.
	pub fn complete(&self, result: CallResult) -> bool {
		tracing::debug!(id = result.id, "Processing call result");
		match result.outcome {
			CallOutcome::Resolved(value) => self.calls.resolve(result.id, value),
			CallOutcome::Rejected(error) => self.calls.reject(result.id, Error::Remote(error)),
		}
	}
}

impl CallSink for Connection {
	fn call(&self, method: &str, args: Vec<Value>) -> PendingCall {
		Connection::call(self, method, args)
	}
}

#[cfg(test)]
mod tests;
