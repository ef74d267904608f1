//! The bridge between the host and one embedded player document.
//!
//! [`Bridge`] routes every inbound envelope, owns the remote method surface and
//! drives the reconciler. It has two phases: [`Phase::NotReady`] until the
//! first `ready` envelope, then [`Phase::Ready`]. The transition installs the
//! controller, marks the bridge ready and then calls the host's `on_ready`, in
//! that order, so the controller exists before readiness is observable.
//!
//! Inbound errors are contained per envelope: a bad envelope is logged and
//! dropped, and the next one is routed normally.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use ytb_protocol::InboundEnvelope;
use ytb_runtime::{CallSink, Connection, Error, Result, Transport, transport};

use crate::callbacks::PlayerCallbacks;
use crate::config::BridgeConfig;
use crate::console;
use crate::controller::PlayerController;
use crate::events::{EventHub, ForeignEvent, Subscription};
use crate::load_policy::{LoadPolicy, LoadRequest};
use crate::reconciler::{PlayerCommand, PlayerTarget, Reconciler};

/// Readiness phase of the embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	NotReady,
	Ready,
}

struct BridgeState {
	phase: Phase,
	controller: PlayerController,
	target: PlayerTarget,
	reconciler: Reconciler,
}

/// Builder for [`Bridge`].
#[derive(Default)]
pub struct BridgeBuilder {
	config: BridgeConfig,
	callbacks: PlayerCallbacks,
	target: PlayerTarget,
	open_external: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl BridgeBuilder {
	pub fn config(mut self, config: BridgeConfig) -> Self {
		self.config = config;
		self
	}

	pub fn callbacks(mut self, callbacks: PlayerCallbacks) -> Self {
		self.callbacks = callbacks;
		self
	}

	/// Initial target. Its video id and playlist are the ones the document is
	/// loaded with.
	pub fn target(mut self, target: PlayerTarget) -> Self {
		self.target = target;
		self
	}

	/// Hook for links the load policy sends outside the embedded context.
	pub fn open_external(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
		self.open_external = Some(Arc::new(f));
		self
	}

	pub fn build(self) -> Bridge {
		let BridgeBuilder {
			config,
			callbacks,
			target,
			open_external,
		} = self;

		let mut load_policy = LoadPolicy::from_config(&config);
		if let Some(open) = open_external {
			load_policy = load_policy.with_open_external(move |url| open(url));
		}

		Bridge {
			connection: Arc::new(Connection::new(config.call_timeout())),
			callbacks,
			load_policy,
			events: EventHub::new(),
			state: Mutex::new(BridgeState {
				phase: Phase::NotReady,
				controller: PlayerController::default(),
				reconciler: Reconciler::new(&target, config.load_on_video_change),
				target,
			}),
		}
	}
}

/// Host-side handle to an embedded player.
pub struct Bridge {
	connection: Arc<Connection>,
	callbacks: PlayerCallbacks,
	load_policy: LoadPolicy,
	events: EventHub,
	state: Mutex<BridgeState>,
}

impl Bridge {
	pub fn builder() -> BridgeBuilder {
		BridgeBuilder::default()
	}

	/// Installs the live channel to the embedded document. A player that
	/// became ready before this gets the target applied now.
	pub fn attach(&self, transport: Arc<dyn Transport>) {
		self.connection.attach(transport);
		self.reconcile();
	}

	/// Inbound transport hook: call with the `data` string of every message the
	/// embedded document posts. Never fails; problems are logged.
	pub fn on_message(&self, data: &str) {
		if let Err(e) = self.dispatch(data) {
			match e {
				Error::InvalidReadyPayload(_) => {
					tracing::error!(error = %e, "Player readiness rejected");
				}
				_ => tracing::warn!(error = %e, "Dropped inbound envelope"),
			}
		}
	}

	/// Parses and routes one inbound message, returning what went wrong.
	pub fn dispatch(&self, data: &str) -> Result<()> {
		let envelope = transport::decode(data)?;
		self.route(envelope)
	}

	/// Routes a parsed envelope.
	pub fn route(&self, envelope: InboundEnvelope) -> Result<()> {
		tracing::debug!(kind = envelope.kind(), "Routing envelope");
		match envelope {
			InboundEnvelope::CallResult(result) => {
				self.connection.complete(result);
			}
			InboundEnvelope::Ready(data) => return self.handle_ready(&data),
			InboundEnvelope::StateChange(state) => self.callbacks.change_state(state),
			InboundEnvelope::Error(error) => self.callbacks.error(error),
			InboundEnvelope::QualityChange(quality) => self.callbacks.playback_quality_change(quality),
			InboundEnvelope::RateChange(rate) => self.callbacks.playback_rate_change(rate),
			InboundEnvelope::FullScreenChange(full_screen) => {
				self.callbacks.full_screen_change(full_screen)
			}
			InboundEnvelope::Log(record) => console::emit(&record),
			InboundEnvelope::Unrecognized { kind, data } => {
				self.events.publish(ForeignEvent { kind, data })
			}
		}
		Ok(())
	}

	fn handle_ready(&self, data: &Value) -> Result<()> {
		if self.is_ready() {
			tracing::warn!("Ignoring repeated ready notification");
			return Ok(());
		}

		let sink: Arc<dyn CallSink> = self.connection.clone();
		let controller = PlayerController::build(data, sink)?;
		tracing::debug!(methods = ?controller.supported_api_methods(), "Player ready");

		{
			let mut state = self.state.lock();
			state.controller = controller;
			state.phase = Phase::Ready;
		}

		self.callbacks.ready();
		self.reconcile();
		Ok(())
	}

	/// Replaces the host-declared target and converges the player if ready.
	pub fn set_target(&self, target: PlayerTarget) {
		self.state.lock().target = target;
		self.reconcile();
	}

	/// Edits the current target in place and converges the player if ready.
	pub fn update_target(&self, edit: impl FnOnce(&mut PlayerTarget)) {
		edit(&mut self.state.lock().target);
		self.reconcile();
	}

	pub fn target(&self) -> PlayerTarget {
		self.state.lock().target.clone()
	}

	fn reconcile(&self) {
		let (controller, commands) = {
			let mut guard = self.state.lock();
			let state = &mut *guard;
			if state.phase != Phase::Ready {
				return;
			}
			let commands = state.reconciler.plan(&state.target);
			(state.controller.clone(), commands)
		};
		if commands.is_empty() {
			return;
		}

		let posted = self.issue(&controller, commands);

		let mut state = self.state.lock();
		if state.phase != Phase::Ready {
			return;
		}
		for command in &posted {
			state.reconciler.confirm(command);
		}
	}

	/// Sends each command the controller declares and returns the ones that
	/// reached the transport.
	fn issue(&self, controller: &PlayerController, commands: Vec<PlayerCommand>) -> Vec<PlayerCommand> {
		let mut posted = Vec::with_capacity(commands.len());
		for command in commands {
			let method = command.method;
			let Some(call) = controller.invoke(method, command.args.clone()) else {
				tracing::warn!(method, "Player did not declare method, command skipped");
				continue;
			};
			if call.is_posted() {
				posted.push(command);
			}

			// Results are only logged; without a runtime the call is sent and abandoned.
			if let Ok(handle) = tokio::runtime::Handle::try_current() {
				handle.spawn(async move {
					match call.await {
						Ok(_) => tracing::trace!(method, "Player command done"),
						Err(e) if e.is_context_lost() => {
							tracing::debug!(method, error = %e, "Player command abandoned")
						}
						Err(e) => tracing::warn!(method, error = %e, "Player command failed"),
					}
				});
			}
		}
		posted
	}

	/// The remote method surface. Empty until the player is ready.
	pub fn controller(&self) -> PlayerController {
		self.state.lock().controller.clone()
	}

	pub fn phase(&self) -> Phase {
		self.state.lock().phase
	}

	pub fn is_ready(&self) -> bool {
		self.phase() == Phase::Ready
	}

	pub fn pending_calls(&self) -> usize {
		self.connection.pending_calls()
	}

	/// Drops the embedded context: fails pending calls, clears the controller
	/// and returns to [`Phase::NotReady`] so a reloaded document can handshake
	/// again.
	pub fn teardown(&self) {
		let failed = self.connection.detach();
		let mut state = self.state.lock();
		state.phase = Phase::NotReady;
		state.controller = PlayerController::default();
		state.reconciler.reset();
		tracing::debug!(failed, "Bridge torn down");
	}

	/// Navigation hook: whether the embedded context may load `request`.
	pub fn should_load(&self, request: &LoadRequest) -> bool {
		self.load_policy.should_load(request)
	}

	/// Registers a handler for envelope kinds the bridge does not route itself.
	/// `None` receives every such kind.
	pub fn on_event<F>(&self, kind: Option<&str>, handler: F) -> Subscription
	where
		F: Fn(&ForeignEvent) + Send + Sync + 'static,
	{
		self.events.subscribe(kind, handler)
	}

	pub fn event_stream(&self) -> broadcast::Receiver<ForeignEvent> {
		self.events.stream()
	}

	pub async fn wait_for_event(&self, kind: &str, timeout: Duration) -> Result<ForeignEvent> {
		self.events.wait_for(kind, timeout).await
	}

	/// Routes messages from `inbound` until the channel closes.
	pub async fn run(&self, mut inbound: mpsc::UnboundedReceiver<String>) {
		while let Some(message) = inbound.recv().await {
			self.on_message(&message);
		}
		tracing::debug!("Inbound message channel closed");
	}
}

impl Drop for Bridge {
	fn drop(&mut self) {
		self.connection.detach();
	}
}
