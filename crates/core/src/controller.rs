//! Remote method surface of the embedded player.
//!
//! The embedded document declares its callable methods when it becomes ready.
//! [`PlayerController::build`] turns that list into one [`RemoteMethod`] stub per
//! name. The controller is immutable once built; an undeclared method simply
//! has no stub.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use ytb_protocol::ReadyPayload;
use ytb_runtime::{CallSink, Error, PendingCall, Result};

/// Callable stub for one declared player method.
#[derive(Clone)]
pub struct RemoteMethod {
	name: Arc<str>,
	sink: Arc<dyn CallSink>,
}

impl RemoteMethod {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Sends the call and returns the future of its result.
	pub fn call(&self, args: Vec<Value>) -> PendingCall {
		self.sink.call(&self.name, args)
	}
}

impl std::fmt::Debug for RemoteMethod {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("RemoteMethod").field(&self.name).finish()
	}
}

#[derive(Default)]
struct ControllerInner {
	methods: IndexMap<Arc<str>, RemoteMethod>,
	supported: Vec<String>,
}

/// Handle to the player's declared methods.
///
/// Cheap to clone. The default controller, used before readiness, exposes no
/// methods.
#[derive(Clone, Default)]
pub struct PlayerController {
	inner: Arc<ControllerInner>,
}

impl PlayerController {
	/// Builds the surface from `ready` data.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidReadyPayload`] unless `supportedApiMethods` is an
	/// array of strings.
	pub fn build(ready_data: &Value, sink: Arc<dyn CallSink>) -> Result<Self> {
		let payload = ReadyPayload::from_data(ready_data).map_err(Error::InvalidReadyPayload)?;

		let methods = payload
			.supported_api_methods
			.iter()
			.map(|name| {
				let name: Arc<str> = Arc::from(name.as_str());
				let method = RemoteMethod {
					name: Arc::clone(&name),
					sink: Arc::clone(&sink),
				};
				(name, method)
			})
			.collect();

		Ok(Self {
			inner: Arc::new(ControllerInner {
				methods,
				supported: payload.supported_api_methods,
			}),
		})
	}

	/// Returns the stub for `name`, if the player declared it.
	pub fn method(&self, name: &str) -> Option<&RemoteMethod> {
		self.inner.methods.get(name)
	}

	/// Calls `name` if declared; `None` otherwise.
	pub fn invoke(&self, name: &str, args: Vec<Value>) -> Option<PendingCall> {
		self.method(name).map(|method| method.call(args))
	}

	/// Method names exactly as the player declared them.
	pub fn supported_api_methods(&self) -> &[String] {
		&self.inner.supported
	}

	pub fn supports(&self, name: &str) -> bool {
		self.inner.methods.contains_key(name)
	}

	/// Stubs in declaration order.
	pub fn methods(&self) -> impl Iterator<Item = &RemoteMethod> {
		self.inner.methods.values()
	}

	pub fn len(&self) -> usize {
		self.inner.methods.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.methods.is_empty()
	}
}

impl std::fmt::Debug for PlayerController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PlayerController")
			.field("supported_api_methods", &self.inner.supported)
			.finish()
	}
}
