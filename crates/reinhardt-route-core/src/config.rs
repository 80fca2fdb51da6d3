//! Router configuration.
//!
//! Every field has a default matching classic hash routing, so an empty
//! JSON object is a valid configuration:
//!
//! ```
//! use reinhardt_route_core::RouterConfig;
//!
//! let config = RouterConfig::from_json(r#"{ "base": "/app/" }"#).unwrap();
//! assert_eq!(config.base, "/app/");
//! assert_eq!(config.max_emit_depth, 3);
//! ```

use crate::error::RouteError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base used when none (or an empty one) is configured.
pub const DEFAULT_BASE: &str = "#";

/// Redirect depth after which emissions in the same burst are dropped.
pub const DEFAULT_MAX_EMIT_DEPTH: usize = 3;

/// DOM event used for link interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickEventKind {
	/// `click`
	#[default]
	Click,
	/// `touchstart`, for touch-only documents
	TouchStart,
}

impl ClickEventKind {
	/// Returns the DOM event name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Click => "click",
			Self::TouchStart => "touchstart",
		}
	}
}

/// Runtime-wide routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Hash prefix (`#`, `#!`) or root path prefix (`/app/`).
	pub base: String,
	/// Coalescing window for popstate/hashchange bursts, in milliseconds.
	pub debounce_ms: u64,
	/// Maximum nesting of emissions within one burst.
	pub max_emit_depth: usize,
	/// Delay between document readiness and listener wiring, in milliseconds.
	pub start_delay_ms: u64,
	/// Event used to intercept anchor clicks.
	pub click_event: ClickEventKind,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			base: DEFAULT_BASE.to_string(),
			debounce_ms: 1,
			max_emit_depth: DEFAULT_MAX_EMIT_DEPTH,
			start_delay_ms: 1,
			click_event: ClickEventKind::Click,
		}
	}
}

impl RouterConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from JSON, filling missing fields with defaults.
	///
	/// # Errors
	///
	/// Returns [`RouteError::InvalidConfig`] if the JSON is malformed or the
	/// resulting configuration fails [`RouterConfig::validate`].
	pub fn from_json(json: &str) -> Result<Self, RouteError> {
		let config: Self =
			serde_json::from_str(json).map_err(|e| RouteError::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Sets the base.
	pub fn with_base(mut self, base: impl Into<String>) -> Self {
		self.base = base.into();
		self
	}

	/// Sets the debounce window.
	pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
		self.debounce_ms = debounce_ms;
		self
	}

	/// Sets the maximum emission depth.
	pub fn with_max_emit_depth(mut self, depth: usize) -> Self {
		self.max_emit_depth = depth;
		self
	}

	/// Sets the click event used for interception.
	pub fn with_click_event(mut self, kind: ClickEventKind) -> Self {
		self.click_event = kind;
		self
	}

	/// Checks that the configuration can drive a runtime.
	///
	/// # Errors
	///
	/// Returns [`RouteError::InvalidConfig`] when `max_emit_depth` is zero,
	/// which would drop every emission.
	pub fn validate(&self) -> Result<(), RouteError> {
		if self.max_emit_depth == 0 {
			return Err(RouteError::InvalidConfig(
				"max_emit_depth must be at least 1".to_string(),
			));
		}
		Ok(())
	}

	/// The configured base, or [`DEFAULT_BASE`] when empty.
	pub fn effective_base(&self) -> &str {
		if self.base.is_empty() {
			DEFAULT_BASE
		} else {
			&self.base
		}
	}

	pub(crate) fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub(crate) fn start_delay(&self) -> Duration {
		Duration::from_millis(self.start_delay_ms)
	}
}
