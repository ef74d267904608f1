//! Navigation policy for the embedded document.
//!
//! The view layer asks [`LoadPolicy::should_load`] before navigating the
//! embedded context. Only the player document itself may load; on iOS, links to
//! the YouTube site are handed to the host instead. A URL that does not start
//! with the base URL is refused, whether or not it parses.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::config::{BridgeConfig, Platform};

const IOS_FIRST_LOAD: &str = "about:blank";
const YOUTUBE_SITE: &str = "https://www.youtube.com/";

/// Navigation request as reported by the view layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
	pub url: String,
	/// Top-level document URL, when the request is for a subframe.
	#[serde(default, rename = "mainDocumentURL", alias = "mainDocumentUrl")]
	pub main_document_url: Option<String>,
}

impl LoadRequest {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			main_document_url: None,
		}
	}

	fn target(&self) -> &str {
		self.main_document_url.as_deref().unwrap_or(&self.url)
	}
}

type OpenExternal = Arc<dyn Fn(&str) + Send + Sync>;

/// Decides which navigations the embedded context may perform.
#[derive(Clone)]
pub struct LoadPolicy {
	base_url: String,
	platform: Platform,
	open_external: Option<OpenExternal>,
}

impl LoadPolicy {
	pub fn new(base_url: impl Into<String>, platform: Platform) -> Self {
		Self {
			base_url: base_url.into(),
			platform,
			open_external: None,
		}
	}

	pub fn from_config(config: &BridgeConfig) -> Self {
		Self::new(config.base_url.clone(), config.platform)
	}

	/// Hook receiving links that should open outside the embedded context.
	pub fn with_open_external(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
		self.open_external = Some(Arc::new(f));
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Returns true if the embedded context may navigate to `request`.
	pub fn should_load(&self, request: &LoadRequest) -> bool {
		let url = request.target();

		if self.platform == Platform::Ios {
			if url == IOS_FIRST_LOAD {
				return true;
			}
			if url.starts_with(YOUTUBE_SITE) {
				match &self.open_external {
					Some(open) => open(url),
					None => tracing::debug!(url, "No external opener, dropping YouTube link"),
				}
				return false;
			}
		}

		let allow = self.within_base(url);
		if !allow {
			tracing::debug!(url, base_url = %self.base_url, "Navigation refused");
		}
		allow
	}

	/// Prefix match on the base URL. When both sides parse, the origins must
	/// also agree, so `https://player.test` does not admit
	/// `https://player.test.evil.example/`.
	fn within_base(&self, url: &str) -> bool {
		if !url.starts_with(&self.base_url) {
			return false;
		}
		match (Url::parse(&self.base_url), Url::parse(url)) {
			(Ok(base), Ok(target)) if base.origin().is_tuple() => base.origin() == target.origin(),
			_ => true,
		}
	}
}

impl std::fmt::Debug for LoadPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoadPolicy")
			.field("base_url", &self.base_url)
			.field("platform", &self.platform)
			.field("open_external", &self.open_external.is_some())
			.finish()
	}
}
