//! Error types for the routing core.
//!
//! Matching itself never fails: an unmatched path is `None`, a malformed
//! filter never matches and redirect overflow is dropped. Errors only come
//! from the navigation host and from configuration.

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
	/// The host has no window, document or history object.
	#[error("Navigation host unavailable: {0}")]
	HostUnavailable(String),
	/// `pushState` / `replaceState` was rejected by the host.
	#[error("History update failed: {0}")]
	HistoryFailed(String),
	/// A popstate, hashchange or click listener could not be attached.
	#[error("Failed to attach listener: {0}")]
	ListenerFailed(String),
	/// The router configuration is unusable.
	#[error("Invalid router configuration: {0}")]
	InvalidConfig(String),
}
