use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use ytb::{BridgeConfig, LoadPolicy, LoadRequest};

use crate::cli::ShouldLoadArgs;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Decision<'a> {
	url: &'a str,
	allow: bool,
	opened_externally: Vec<String>,
}

pub fn execute(args: ShouldLoadArgs, mut config: BridgeConfig) -> Result<()> {
	if let Some(platform) = args.platform {
		config.platform = platform.into();
	}

	let opened = Arc::new(Mutex::new(Vec::new()));
	let policy = LoadPolicy::from_config(&config).with_open_external({
		let opened = Arc::clone(&opened);
		move |url| opened.lock().push(url.to_string())
	});

	let request = LoadRequest {
		url: args.url.clone(),
		main_document_url: args.main_document_url,
	};
	let allow = policy.should_load(&request);
	tracing::info!(url = %args.url, allow, "Navigation decided");

	let decision = Decision {
		url: &args.url,
		allow,
		opened_externally: std::mem::take(&mut *opened.lock()),
	};
	println!("{}", serde_json::to_string(&decision)?);
	Ok(())
}
