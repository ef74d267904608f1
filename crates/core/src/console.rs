//! Re-emits console output of the embedded document through `tracing`.

use ytb_protocol::{ConsoleLevel, ConsoleRecord};

pub(crate) fn emit(record: &ConsoleRecord) {
	let line = record.line();
	match record.level {
		ConsoleLevel::Debug => tracing::debug!(target: "ytb::embedded", "[WebViewConsole] {line}"),
		ConsoleLevel::Info | ConsoleLevel::Other => {
			tracing::info!(target: "ytb::embedded", "[WebViewConsole] {line}")
		}
		ConsoleLevel::Warn => tracing::warn!(target: "ytb::embedded", "[WebViewConsole] {line}"),
		ConsoleLevel::Error => tracing::error!(target: "ytb::embedded", "[WebViewConsole] {line}"),
	}
}
