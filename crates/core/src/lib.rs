//! Host-side bridge to an embedded web video player.
//!
//! The player runs inside a sandboxed document that can only be reached by
//! posting string messages. [`Bridge`] turns that channel into:
//!
//! - a remote method surface ([`PlayerController`]) built from the methods the
//!   player declares when it becomes ready,
//! - typed lifecycle callbacks ([`PlayerCallbacks`]),
//! - a generic stream for any other event kind ([`Bridge::on_event`]),
//! - reconciliation of host-declared state ([`PlayerTarget`]) into player calls.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ytb::{Bridge, ChannelTransport, PlayerCallbacks, PlayerTarget};
//!
//! let (transport, mut outbound) = ChannelTransport::new();
//! let bridge = Bridge::builder()
//!     .callbacks(PlayerCallbacks::new().on_ready(|| println!("ready")))
//!     .build();
//! bridge.attach(Arc::new(transport));
//!
//! // Feed every message the embedded document posts:
//! bridge.on_message(r#"{"kind":"ready","data":{"supportedApiMethods":["playVideo"]}}"#);
//! bridge.set_target(PlayerTarget { playing: true, ..Default::default() });
//! ```

pub mod bridge;
pub mod callbacks;
pub mod config;
mod console;
pub mod controller;
pub mod events;
pub mod load_policy;
pub mod reconciler;

pub use bridge::{Bridge, BridgeBuilder, Phase};
pub use callbacks::PlayerCallbacks;
pub use config::{BridgeConfig, DEFAULT_BASE_URL, DEFAULT_CALL_TIMEOUT_MS, Platform};
pub use controller::{PlayerController, RemoteMethod};
pub use events::{ForeignEvent, HandlerId, Subscription};
pub use load_policy::{LoadPolicy, LoadRequest};
pub use reconciler::{AppliedSnapshot, PlayerCommand, PlayerTarget, Reconciler};
pub use ytb_protocol::{
	CallResult, ConsoleLevel, ConsoleRecord, InboundEnvelope, OutboundEnvelope, PlayerError,
	PlayerState, Playlist, PlaylistRequest, methods,
};
pub use ytb_runtime::{ChannelTransport, Error, PendingCall, Result, Transport};
