//! Envelopes exchanged with the embedded document.
//!
//! Outbound envelopes are serialized with an internal `kind` tag. Inbound
//! envelopes go through [`RawEnvelope`] first so that unknown kinds survive as
//! [`InboundEnvelope::Unrecognized`] instead of failing to parse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::player::{ConsoleRecord, PlayerError, PlayerState};

/// Envelope sent from the host to the embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutboundEnvelope {
	/// Invoke a player method.
	Call(CallEnvelope),
}

/// Body of a `call` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEnvelope {
	/// Correlation id, unique for the lifetime of the connection.
	pub id: u64,
	/// Player method name as declared at readiness.
	pub method: String,
	/// Positional arguments.
	pub args: Vec<Value>,
}

/// Settlement carried by a `call-result` envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
	Resolved(Value),
	Rejected(Value),
}

/// A `call-result` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
	pub id: u64,
	pub outcome: CallOutcome,
}

impl CallResult {
	pub fn resolved(id: u64, result: Value) -> Self {
		Self {
			id,
			outcome: CallOutcome::Resolved(result),
		}
	}

	pub fn rejected(id: u64, error: Value) -> Self {
		Self {
			id,
			outcome: CallOutcome::Rejected(error),
		}
	}
}

/// Envelope sent from the embedded document to the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub enum InboundEnvelope {
	/// Completion of a prior [`CallEnvelope`].
	CallResult(CallResult),
	/// The player initialized. Data is validated by the router, not here, so a
	/// bad method list surfaces as a configuration error rather than a parse error.
	Ready(Value),
	StateChange(PlayerState),
	Error(PlayerError),
	QualityChange(String),
	RateChange(f64),
	FullScreenChange(bool),
	/// Console output forwarded from the embedded document.
	Log(ConsoleRecord),
	/// Any kind the bridge does not special-case.
	Unrecognized { kind: String, data: Value },
}

impl InboundEnvelope {
	/// Returns the wire `kind` tag of this envelope.
	pub fn kind(&self) -> &str {
		match self {
			Self::CallResult(_) => KIND_CALL_RESULT,
			Self::Ready(_) => KIND_READY,
			Self::StateChange(_) => KIND_STATE_CHANGE,
			Self::Error(_) => KIND_ERROR,
			Self::QualityChange(_) => KIND_QUALITY_CHANGE,
			Self::RateChange(_) => KIND_RATE_CHANGE,
			Self::FullScreenChange(_) => KIND_FULLSCREEN_CHANGE,
			Self::Log(_) => KIND_LOG,
			Self::Unrecognized { kind, .. } => kind,
		}
	}
}

pub const KIND_CALL_RESULT: &str = "call-result";
pub const KIND_READY: &str = "ready";
pub const KIND_STATE_CHANGE: &str = "state-change";
pub const KIND_ERROR: &str = "error";
pub const KIND_QUALITY_CHANGE: &str = "quality-change";
pub const KIND_RATE_CHANGE: &str = "rate-change";
pub const KIND_FULLSCREEN_CHANGE: &str = "fullscreen-change";
pub const KIND_LOG: &str = "log";

/// Untyped shape shared by every inbound envelope.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
	kind: String,
	#[serde(default)]
	id: Option<u64>,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<Value>,
	#[serde(default)]
	data: Value,
}

impl TryFrom<RawEnvelope> for InboundEnvelope {
	type Error = String;

	fn try_from(raw: RawEnvelope) -> Result<Self, String> {
		let RawEnvelope {
			kind,
			id,
			result,
			error,
			data,
		} = raw;

		let envelope = match kind.as_str() {
			KIND_CALL_RESULT => {
				let id = id.ok_or("call-result envelope missing 'id'")?;
				match error {
					Some(error) => Self::CallResult(CallResult::rejected(id, error)),
					None => Self::CallResult(CallResult::resolved(id, result.unwrap_or(Value::Null))),
				}
			}
			KIND_READY => Self::Ready(data),
			KIND_STATE_CHANGE => Self::StateChange(PlayerState::from_code(code(&kind, &data)?)),
			KIND_ERROR => Self::Error(PlayerError::from_code(code(&kind, &data)?)),
			KIND_QUALITY_CHANGE => Self::QualityChange(match data {
				Value::String(quality) => quality,
				other => other.to_string(),
			}),
			KIND_RATE_CHANGE => Self::RateChange(
				data.as_f64()
					.ok_or_else(|| format!("rate-change data is not a number: {data}"))?,
			),
			KIND_FULLSCREEN_CHANGE => Self::FullScreenChange(
				data.as_bool()
					.ok_or_else(|| format!("fullscreen-change data is not a boolean: {data}"))?,
			),
			KIND_LOG => Self::Log(
				serde_json::from_value(data).map_err(|e| format!("invalid log envelope: {e}"))?,
			),
			_ => Self::Unrecognized { kind, data },
		};

		Ok(envelope)
	}
}

/// Reads a numeric player code. The embedded side sometimes stringifies codes.
fn code(kind: &str, data: &Value) -> Result<i64, String> {
	match data {
		Value::Number(n) => n.as_i64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
	.ok_or_else(|| format!("{kind} data is not a player code: {data}"))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::player::ConsoleLevel;

	fn parse(value: Value) -> InboundEnvelope {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn call_envelope_wire_shape() {
		let envelope = OutboundEnvelope::Call(CallEnvelope {
			id: 7,
			method: "seekTo".to_string(),
			args: vec![json!(42), json!(true)],
		});

		assert_eq!(
			serde_json::to_value(&envelope).unwrap(),
			json!({"kind": "call", "id": 7, "method": "seekTo", "args": [42, true]})
		);
	}

	#[test]
	fn call_result_with_error_is_rejected() {
		let envelope = parse(json!({"kind": "call-result", "id": 3, "error": {"message": "boom"}}));
		assert_eq!(
			envelope,
			InboundEnvelope::CallResult(CallResult::rejected(3, json!({"message": "boom"})))
		);
	}

	#[test]
	fn call_result_without_result_resolves_to_null() {
		let envelope = parse(json!({"kind": "call-result", "id": 3}));
		assert_eq!(envelope, InboundEnvelope::CallResult(CallResult::resolved(3, Value::Null)));
	}

	#[test]
	fn call_result_requires_id() {
		let err = serde_json::from_value::<InboundEnvelope>(json!({"kind": "call-result", "result": 1}))
			.unwrap_err();
		assert!(err.to_string().contains("missing 'id'"), "{err}");
	}

	#[test]
	fn state_change_accepts_string_codes() {
		assert_eq!(
			parse(json!({"kind": "state-change", "data": "1"})),
			InboundEnvelope::StateChange(PlayerState::Playing)
		);
		assert_eq!(
			parse(json!({"kind": "state-change", "data": 5})),
			InboundEnvelope::StateChange(PlayerState::VideoCued)
		);
	}

	#[test]
	fn log_envelope_reads_type_field() {
		let envelope = parse(json!({"kind": "log", "data": {"type": "warn", "log": ["a", 1]}}));
		match envelope {
			InboundEnvelope::Log(record) => {
				assert_eq!(record.level, ConsoleLevel::Warn);
				assert_eq!(record.line(), "a 1");
			}
			other => panic!("Expected Log, got {other:?}"),
		}
	}

	#[test]
	fn unknown_kind_is_preserved() {
		let envelope = parse(json!({"kind": "autoplay-blocked", "data": {"muted": true}}));
		assert_eq!(envelope.kind(), "autoplay-blocked");
		assert_eq!(
			envelope,
			InboundEnvelope::Unrecognized {
				kind: "autoplay-blocked".to_string(),
				data: json!({"muted": true}),
			}
		);
	}

	#[test]
	fn missing_kind_fails() {
		assert!(serde_json::from_str::<InboundEnvelope>(r#"{"data": 1}"#).is_err());
	}

	#[test]
	fn bad_rate_fails() {
		assert!(serde_json::from_value::<InboundEnvelope>(json!({"kind": "rate-change", "data": "fast"})).is_err());
	}
}
