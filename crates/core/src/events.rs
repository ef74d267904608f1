//! Generic event stream for envelope kinds the bridge does not special-case.
//!
//! Handlers live in an [`IndexMap`] keyed by [`HandlerId`], which gives O(1)
//! removal and delivery in registration order. Async consumers can use the
//! broadcast stream instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use ytb_runtime::{Error, Result};

/// Unique identifier for event handlers.
pub type HandlerId = u64;

/// Event of a kind the bridge does not route itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignEvent {
	pub kind: String,
	pub data: Value,
}

/// Handler function for foreign events.
pub type EventHandlerFn = Arc<dyn Fn(&ForeignEvent) + Send + Sync>;

/// Registered handler with its kind filter (`None` receives every kind).
#[derive(Clone)]
pub struct HandlerEntry {
	pub id: HandlerId,
	pub kind: Option<String>,
	pub handler: EventHandlerFn,
}

impl HandlerEntry {
	fn accepts(&self, kind: &str) -> bool {
		self.kind.as_deref().is_none_or(|k| k == kind)
	}
}

type HandlerMap = Arc<Mutex<IndexMap<HandlerId, HandlerEntry>>>;

const STREAM_CAPACITY: usize = 64;

/// Fan-out point for [`ForeignEvent`]s.
pub struct EventHub {
	next_id: AtomicU64,
	handlers: HandlerMap,
	tx: broadcast::Sender<ForeignEvent>,
}

impl Default for EventHub {
	fn default() -> Self {
		Self::new()
	}
}

impl EventHub {
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(STREAM_CAPACITY);
		Self {
			next_id: AtomicU64::new(1),
			handlers: Arc::new(Mutex::new(IndexMap::new())),
			tx,
		}
	}

	/// Registers a handler, optionally restricted to one kind.
	///
	/// The handler stays registered until the returned [`Subscription`] drops.
	pub fn subscribe<F>(&self, kind: Option<&str>, handler: F) -> Subscription
	where
		F: Fn(&ForeignEvent) + Send + Sync + 'static,
	{
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let kind = kind.map(str::to_string);
		self.handlers.lock().insert(
			id,
			HandlerEntry {
				id,
				kind: kind.clone(),
				handler: Arc::new(handler),
			},
		);
		Subscription::new(id, kind, &self.handlers)
	}

	/// Returns a broadcast receiver for every foreign event published from now on.
	pub fn stream(&self) -> broadcast::Receiver<ForeignEvent> {
		self.tx.subscribe()
	}

	/// Delivers an event to matching handlers, then to stream subscribers.
	pub fn publish(&self, event: ForeignEvent) {
		let handlers: Vec<_> = {
			let map = self.handlers.lock();
			map.values()
				.filter(|entry| entry.accepts(&event.kind))
				.map(|entry| entry.handler.clone())
				.collect()
		};

		tracing::debug!(kind = %event.kind, handlers = handlers.len(), "Publishing foreign event");
		for handler in handlers {
			handler(&event);
		}

		// No receivers is fine.
		let _ = self.tx.send(event);
	}

	/// Waits for the next event of `kind`.
	///
	/// # Errors
	///
	/// Returns [`Error::EventTimeout`] or [`Error::ChannelClosed`].
	pub async fn wait_for(&self, kind: &str, timeout: Duration) -> Result<ForeignEvent> {
		let mut rx = self.stream();

		tokio::time::timeout(timeout, async move {
			loop {
				match rx.recv().await {
					Ok(event) if event.kind == kind => return Ok(event),
					Ok(_) => continue,
					Err(broadcast::error::RecvError::Lagged(n)) => {
						tracing::warn!(dropped = n, "Foreign event receiver lagged");
					}
					Err(broadcast::error::RecvError::Closed) => {
						return Err(Error::ChannelClosed);
					}
				}
			}
		})
		.await
		.map_err(|_| Error::EventTimeout {
			kind: kind.to_string(),
			after: timeout,
		})?
	}

	pub fn handler_count(&self) -> usize {
		self.handlers.lock().len()
	}
}

/// Keeps one foreign event handler registered. Dropping it removes the
/// handler; once the hub itself is gone there is nothing left to remove.
pub struct Subscription {
	id: HandlerId,
	kind: Option<String>,
	registry: Weak<Mutex<IndexMap<HandlerId, HandlerEntry>>>,
}

impl Subscription {
	fn new(id: HandlerId, kind: Option<String>, handlers: &HandlerMap) -> Self {
		Self {
			id,
			kind,
			registry: Arc::downgrade(handlers),
		}
	}

	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Event kind this handler is restricted to, `None` for every kind.
	pub fn kind(&self) -> Option<&str> {
		self.kind.as_deref()
	}

	/// Whether the handler is still registered with a live hub.
	pub fn is_active(&self) -> bool {
		self.registry
			.upgrade()
			.is_some_and(|handlers| handlers.lock().contains_key(&self.id))
	}

	/// Removes the handler now. Returns false if the hub was already gone.
	pub fn unsubscribe(mut self) -> bool {
		self.release()
	}

	fn release(&mut self) -> bool {
		let registry = std::mem::take(&mut self.registry);
		match registry.upgrade() {
			Some(handlers) => handlers.lock().shift_remove(&self.id).is_some(),
			None => false,
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if self.release() {
			tracing::trace!(id = self.id, kind = ?self.kind, "Event handler removed");
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("kind", &self.kind)
			.field("active", &self.is_active())
			.finish()
	}
}
