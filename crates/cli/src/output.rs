//! Records written to stdout, one JSON object per line.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Record<'a> {
	/// An envelope the bridge posted to the embedded document.
	Outbound { envelope: Value },
	/// A host callback fired.
	Callback { name: &'a str, value: Value },
	/// An envelope kind the bridge does not route itself.
	Event { kind: &'a str, data: Value },
	/// An input line the bridge refused.
	Rejected { line: usize, error: String },
	#[serde(rename_all = "camelCase")]
	Summary {
		ready: bool,
		supported_api_methods: Vec<String>,
		pending_calls: usize,
	},
}

pub fn emit(record: &Record<'_>) {
	let mut stdout = std::io::stdout().lock();
	match serde_json::to_string(record) {
		Ok(line) => {
			if let Err(e) = writeln!(stdout, "{line}") {
				tracing::error!(error = %e, "Failed to write record");
			}
		}
		Err(e) => tracing::error!(error = %e, "Failed to serialize record"),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn records_are_tagged() {
		let record = Record::Callback {
			name: "onChangeState",
			value: json!("playing"),
		};
		assert_eq!(
			serde_json::to_value(&record).unwrap(),
			json!({"type": "callback", "name": "onChangeState", "value": "playing"})
		);

		let summary = Record::Summary {
			ready: true,
			supported_api_methods: vec!["playVideo".into()],
			pending_calls: 0,
		};
		assert_eq!(
			serde_json::to_value(&summary).unwrap(),
			json!({
				"type": "summary",
				"ready": true,
				"supportedApiMethods": ["playVideo"],
				"pendingCalls": 0
			})
		);
	}
}
