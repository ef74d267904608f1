//! Bridge runtime - transport adapter and call correlation.
//!
//! This crate provides the plumbing between the host and an embedded player
//! document that can only be reached by message passing:
//!
//! - **Transport**: the outbound `postMessage` primitive and envelope codec
//! - **Connection**: call ids, pending call table, result correlation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │     ytb     │  Router, controller, reconciler
//! └──────┬──────┘
//!        │ calls through CallSink
//! ┌──────▼──────┐
//! │ ytb-runtime │  This crate
//! │  ┌────────┐ │
//! │  │ Conn   │ │  Id allocation, pending calls
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Trans  │ │  postMessage + JSON envelopes
//! │  └────────┘ │
//! └─────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod transport;

pub use connection::{CallSink, Connection, PendingCall, PendingCalls};
pub use error::{Error, Result};
pub use transport::{ChannelTransport, Transport};
