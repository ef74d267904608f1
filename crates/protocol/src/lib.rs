//! Wire types for the embedded player bridge.
//!
//! The host and the embedded document exchange JSON-encoded envelopes over a
//! postMessage-style channel. Every envelope carries a `kind` tag:
//!
//! - host → embedded: [`OutboundEnvelope::Call`]
//! - embedded → host: [`InboundEnvelope`] (call results and lifecycle notifications)
//!
//! Types in this crate are pure data. Correlation, routing and reconciliation live
//! in `ytb-runtime` and `ytb`.

pub mod envelope;
pub mod player;
pub mod playlist;

pub use envelope::*;
pub use player::*;
pub use playlist::*;
