//! Correlation registry for in-flight player calls.
//!
//! Each call gets an id from an instance-owned counter and a single-use
//! [`oneshot`] completion handle stored in a [`DashMap`]. Settling removes the
//! entry first, so a duplicate or late result finds nothing and is ignored.
//!
//! A call's deadline is fixed when it is registered. The future's timer counts
//! toward that instant, and [`PendingCalls::expire`] rejects overdue entries
//! whose futures are never polled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::{Instant, Sleep};

use crate::error::{Error, Result};

struct Entry {
	tx: oneshot::Sender<Result<Value>>,
	method: String,
	timeout: Option<Timeout>,
}

#[derive(Debug, Clone, Copy)]
struct Timeout {
	after: Duration,
	deadline: Instant,
}

impl Timeout {
	fn starting_now(after: Duration) -> Self {
		Self {
			after,
			deadline: Instant::now() + after,
		}
	}
}

/// Pending call table keyed by call id.
pub struct PendingCalls {
	last_id: AtomicU64,
	entries: DashMap<u64, Entry>,
}

impl Default for PendingCalls {
	fn default() -> Self {
		Self::new()
	}
}

impl PendingCalls {
	pub fn new() -> Self {
		Self {
			last_id: AtomicU64::new(0),
			entries: DashMap::new(),
		}
	}

	/// Returns the next call id. Ids strictly increase and are never reused.
	pub fn next_id(&self) -> u64 {
		self.last_id.fetch_add(1, Ordering::SeqCst)
	}

	/// Creates the pending entry for `id` and returns the future that settles it.
	///
	/// The deadline, if any, is `timeout` from now.
	pub fn register(self: &Arc<Self>, id: u64, method: &str, timeout: Option<Duration>) -> PendingCall {
		let (tx, rx) = oneshot::channel();
		let timeout = timeout.map(Timeout::starting_now);
		let entry = Entry {
			tx,
			method: method.to_string(),
			timeout,
		};
		if self.entries.insert(id, entry).is_some() {
			tracing::warn!(id, "Replaced an existing pending call entry");
		}

		PendingCall {
			id: Some(id),
			method: method.to_string(),
			state: CallState::Waiting(rx),
			guard: Some(CancelGuard {
				id,
				calls: Arc::clone(self),
				completed: false,
			}),
			timeout,
			sleep: None,
		}
	}

	/// Settles `id` successfully. Returns false if nothing was pending under `id`.
	pub fn resolve(&self, id: u64, result: Value) -> bool {
		self.settle(id, Ok(result))
	}

	/// Settles `id` with an error. Returns false if nothing was pending under `id`.
	pub fn reject(&self, id: u64, error: Error) -> bool {
		self.settle(id, Err(error))
	}

	fn settle(&self, id: u64, outcome: Result<Value>) -> bool {
		match self.entries.remove(&id) {
			Some((_, entry)) => {
				if entry.tx.send(outcome).is_err() {
					tracing::debug!(id, "Call settled after its future was dropped");
				}
				true
			}
			None => {
				tracing::debug!(id, "No pending call for result (late or duplicate, ignored)");
				false
			}
		}
	}

	/// Removes an entry without settling it.
	pub fn abandon(&self, id: u64) -> bool {
		self.entries.remove(&id).is_some()
	}

	/// Rejects every pending call with the error produced by `make_error`.
	pub fn fail_all(&self, make_error: impl Fn() -> Error) -> usize {
		let ids: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
		ids.into_iter().filter(|id| self.reject(*id, make_error())).count()
	}

	/// Rejects every call whose deadline has passed with [`Error::Timeout`].
	///
	/// Returns the number of calls expired.
	pub fn expire(&self) -> usize {
		let now = Instant::now();
		let overdue: Vec<(u64, String, Duration)> = self
			.entries
			.iter()
			.filter_map(|entry| {
				let timeout = entry.timeout?;
				(timeout.deadline <= now).then(|| (*entry.key(), entry.method.clone(), timeout.after))
			})
			.collect();

		let mut expired = 0;
		for (id, method, after) in overdue {
			tracing::warn!(id, method = %method, ?after, "Player call timed out");
			if self.reject(id, Error::Timeout { method, id, after }) {
				expired += 1;
			}
		}
		expired
	}

	pub fn contains(&self, id: u64) -> bool {
		self.entries.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Removes the pending entry when a call future is dropped before settling.
struct CancelGuard {
	id: u64,
	calls: Arc<PendingCalls>,
	completed: bool,
}

impl CancelGuard {
	fn complete(&mut self) {
		self.completed = true;
	}
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if !self.completed && self.calls.abandon(self.id) {
			tracing::debug!(id = self.id, "CancelGuard: removed abandoned call");
		}
	}
}

enum CallState {
	Waiting(oneshot::Receiver<Result<Value>>),
	Failed(Option<Error>),
}

/// Future of a single player call.
///
/// The call envelope is already on the wire when this exists; awaiting only
/// waits for the result. Dropping it abandons the call and frees its entry.
#[must_use = "dropping a PendingCall abandons the result"]
pub struct PendingCall {
	id: Option<u64>,
	method: String,
	state: CallState,
	guard: Option<CancelGuard>,
	timeout: Option<Timeout>,
	sleep: Option<Pin<Box<Sleep>>>,
}

impl PendingCall {
	/// A call that failed before reaching the wire.
	pub fn failed(method: &str, error: Error) -> Self {
		Self {
			id: None,
			method: method.to_string(),
			state: CallState::Failed(Some(error)),
			guard: None,
			timeout: None,
			sleep: None,
		}
	}

	/// Correlation id, or `None` if the call never reached the wire.
	pub fn id(&self) -> Option<u64> {
		self.id
	}

	/// Whether the call envelope was posted to the embedded document.
	pub fn is_posted(&self) -> bool {
		self.id.is_some()
	}

	pub fn method(&self) -> &str {
		&self.method
	}

	fn finish(&mut self) {
		if let Some(guard) = self.guard.as_mut() {
			guard.complete();
		}
	}
}

impl Future for PendingCall {
	type Output = Result<Value>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.get_mut();

		let rx = match &mut this.state {
			CallState::Failed(error) => {
				return Poll::Ready(Err(error.take().unwrap_or(Error::ChannelClosed)));
			}
			CallState::Waiting(rx) => rx,
		};

		if let Poll::Ready(result) = Pin::new(rx).poll(cx) {
			this.finish();
			return Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r));
		}

		let (Some(timeout), Some(id)) = (this.timeout, this.id) else {
			return Poll::Pending;
		};

		// Sleep is built lazily since it needs a runtime; the deadline was fixed at send.
		let sleep = this
			.sleep
			.get_or_insert_with(|| Box::pin(tokio::time::sleep_until(timeout.deadline)));
		if sleep.as_mut().poll(cx).is_pending() {
			return Poll::Pending;
		}

		if let Some(guard) = this.guard.as_mut() {
			guard.calls.abandon(id);
			guard.complete();
		}
		tracing::warn!(id, method = %this.method, after = ?timeout.after, "Player call timed out");
		this.state = CallState::Failed(None);

		Poll::Ready(Err(Error::Timeout {
			method: this.method.clone(),
			id,
			after: timeout.after,
		}))
	}
}
