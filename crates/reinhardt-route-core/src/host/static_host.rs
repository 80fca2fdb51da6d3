//! Host without location or history.

use super::{ClickHandler, HostListener, NavigationHost, TimerId};
use crate::config::ClickEventKind;
use crate::error::RouteError;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// A document without `location`, `history` or timers.
///
/// Used when routing runs outside a browser, e.g. server-side. Navigation
/// dispatches the requested path directly; start/stop wire nothing.
#[derive(Debug, Default)]
pub struct StaticHost {
	title: RefCell<String>,
}

impl StaticHost {
	/// Creates a host with an empty title.
	pub fn new() -> Self {
		Self::default()
	}
}

impl NavigationHost for StaticHost {
	fn current_url(&self) -> Option<String> {
		None
	}

	fn history_available(&self) -> bool {
		false
	}

	fn push_state(&self, _url: &str, _title: &str) -> Result<(), RouteError> {
		Err(RouteError::HostUnavailable("history API".to_string()))
	}

	fn replace_state(&self, _url: &str, _title: &str) -> Result<(), RouteError> {
		Err(RouteError::HostUnavailable("history API".to_string()))
	}

	fn title(&self) -> String {
		self.title.borrow().clone()
	}

	fn set_title(&self, title: &str) {
		*self.title.borrow_mut() = title.to_string();
	}

	fn is_ready(&self) -> bool {
		true
	}

	fn when_ready(&self, callback: Box<dyn FnOnce()>) {
		callback();
	}

	// No event loop: timers never fire.
	fn set_timeout(&self, _delay: Duration, _callback: Box<dyn FnOnce()>) -> TimerId {
		TimerId::new(0)
	}

	fn clear_timeout(&self, _timer: TimerId) {}

	fn on_pop_state(&self, _callback: Rc<dyn Fn()>) -> Result<HostListener, RouteError> {
		Ok(HostListener::noop())
	}

	fn on_link_click(
		&self,
		_kind: ClickEventKind,
		_callback: ClickHandler,
	) -> Result<HostListener, RouteError> {
		Ok(HostListener::noop())
	}
}
