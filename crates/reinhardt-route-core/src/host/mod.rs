//! Navigation hosts.
//!
//! The router never touches `window`, `history` or `document` directly; it
//! goes through a [`NavigationHost`]. Three hosts ship with the crate:
//!
//! - [`BrowserHost`] (wasm32 only): web-sys bindings to the real DOM.
//! - [`MemoryHost`]: an in-memory session history with manual timers, used
//!   by tests and headless environments.
//! - [`StaticHost`]: no history API at all; navigation dispatches directly
//!   (server-side usage).

mod memory;
mod static_host;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHost;
pub use memory::MemoryHost;
pub use static_host::StaticHost;

use crate::config::ClickEventKind;
use crate::error::RouteError;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Handle to a scheduled host timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(i32);

impl TimerId {
	/// Wraps a raw host timer handle.
	pub fn new(raw: i32) -> Self {
		Self(raw)
	}

	/// Returns the raw host handle.
	pub fn raw(&self) -> i32 {
		self.0
	}
}

/// Guard for a listener attached to the host; detaches it when dropped.
#[must_use = "the listener is detached as soon as the guard is dropped"]
pub struct HostListener {
	detach: Option<Box<dyn FnOnce()>>,
}

impl HostListener {
	/// Creates a guard that runs `detach` once.
	pub fn new(detach: impl FnOnce() + 'static) -> Self {
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// A guard with nothing to detach.
	pub fn noop() -> Self {
		Self { detach: None }
	}

	/// Detaches the listener now.
	pub fn detach(mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl Drop for HostListener {
	fn drop(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl fmt::Debug for HostListener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HostListener")
			.field("attached", &self.detach.is_some())
			.finish()
	}
}

/// The anchor element enclosing a click target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
	/// Resolved (absolute) `href`; `None` when the attribute is absent.
	pub href: Option<String>,
	/// Whether the anchor carries a `download` attribute.
	pub download: bool,
	/// The `target` attribute, if any.
	pub target: Option<String>,
	/// The `title` attribute, if any.
	pub title: Option<String>,
}

impl Anchor {
	/// An anchor pointing at `href`.
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: Some(href.into()),
			..Self::default()
		}
	}

	/// Sets the `target` attribute.
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	/// Sets the `title` attribute.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Sets the `download` attribute.
	pub fn with_download(mut self, download: bool) -> Self {
		self.download = download;
		self
	}
}

/// A click as seen by the interceptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
	/// `MouseEvent.button`; 0 is the primary button.
	pub button: i16,
	/// Meta (command) key held.
	pub meta_key: bool,
	/// Control key held.
	pub ctrl_key: bool,
	/// Shift key held.
	pub shift_key: bool,
	/// `preventDefault()` already called by another handler.
	pub default_prevented: bool,
	/// Nearest enclosing anchor of the event target.
	pub anchor: Option<Anchor>,
}

impl ClickEvent {
	/// A plain primary-button click on `anchor`.
	pub fn on(anchor: Anchor) -> Self {
		Self {
			anchor: Some(anchor),
			..Self::default()
		}
	}
}

/// What the host should do with a click after interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
	/// Let the browser follow the link.
	Native,
	/// Call `preventDefault()`; the router already navigated.
	Intercepted,
}

/// Callback receiving intercepted clicks.
pub type ClickHandler = Rc<dyn Fn(&ClickEvent) -> ClickOutcome>;

/// Browser capabilities the router depends on.
///
/// All methods are called on the UI thread. Callbacks handed to the host
/// may reenter the router.
pub trait NavigationHost {
	/// The current absolute URL, or `None` without a location.
	fn current_url(&self) -> Option<String>;

	/// Whether `push_state` / `replace_state` are usable.
	fn history_available(&self) -> bool;

	/// Pushes a session history entry for `url`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::HistoryFailed`] if the host rejects the entry.
	fn push_state(&self, url: &str, title: &str) -> Result<(), RouteError>;

	/// Replaces the current session history entry with `url`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::HistoryFailed`] if the host rejects the entry.
	fn replace_state(&self, url: &str, title: &str) -> Result<(), RouteError>;

	/// The document title.
	fn title(&self) -> String;

	/// Sets the document title.
	fn set_title(&self, title: &str);

	/// Whether the document is `interactive` or `complete`.
	fn is_ready(&self) -> bool;

	/// Runs `callback` once the document becomes interactive.
	fn when_ready(&self, callback: Box<dyn FnOnce()>);

	/// Schedules `callback` after `delay`.
	fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;

	/// Cancels a scheduled callback. Unknown or fired timers are ignored.
	fn clear_timeout(&self, timer: TimerId);

	/// Calls `callback` on every `popstate` and `hashchange`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::ListenerFailed`] if the listener cannot be attached.
	fn on_pop_state(&self, callback: Rc<dyn Fn()>) -> Result<HostListener, RouteError>;

	/// Delivers document clicks of the given kind to `callback`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::ListenerFailed`] if the listener cannot be attached.
	fn on_link_click(
		&self,
		kind: ClickEventKind,
		callback: ClickHandler,
	) -> Result<HostListener, RouteError>;
}
