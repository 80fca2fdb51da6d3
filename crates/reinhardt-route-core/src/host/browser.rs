//! web-sys navigation host.

use super::{
	Anchor, ClickEvent, ClickHandler, ClickOutcome, HostListener, NavigationHost, TimerId,
};
use crate::config::ClickEventKind;
use crate::error::RouteError;
use crate::{debug_log, warn_log};
use gloo_timers::callback::Timeout;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Event, HtmlAnchorElement, MouseEvent, Window};

fn js_message(value: &JsValue) -> String {
	if let Some(error) = value.dyn_ref::<js_sys::Error>() {
		return String::from(error.message());
	}
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

type TimerTable = Rc<RefCell<HashMap<i32, Timeout>>>;

/// The real browser document.
///
/// Pending timers are owned by the host; clearing one drops its closure.
#[derive(Clone)]
pub struct BrowserHost {
	window: Window,
	document: Document,
	timers: TimerTable,
	next_timer: Rc<Cell<i32>>,
}

impl BrowserHost {
	/// Binds to the global `window` and `document`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::HostUnavailable`] outside a browser main thread.
	pub fn new() -> Result<Self, RouteError> {
		let window = web_sys::window()
			.ok_or_else(|| RouteError::HostUnavailable("no global window".to_string()))?;
		let document = window
			.document()
			.ok_or_else(|| RouteError::HostUnavailable("window has no document".to_string()))?;
		Ok(Self {
			window,
			document,
			timers: Rc::default(),
			next_timer: Rc::new(Cell::new(0)),
		})
	}

	/// Number of timers scheduled and not yet fired or cleared.
	pub fn pending_timers(&self) -> usize {
		self.timers.borrow().len()
	}

	fn history(&self) -> Result<web_sys::History, RouteError> {
		self.window
			.history()
			.map_err(|e| RouteError::HostUnavailable(js_message(&e)))
	}

	fn listen(
		&self,
		target: web_sys::EventTarget,
		events: &'static [&'static str],
		closure: Closure<dyn FnMut(Event)>,
	) -> Result<HostListener, RouteError> {
		for event in events {
			target
				.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
				.map_err(|e| RouteError::ListenerFailed(js_message(&e)))?;
		}
		Ok(HostListener::new(move || {
			for event in events {
				if let Err(e) = target
					.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
				{
					warn_log!("Failed to remove {} listener: {}", event, js_message(&e));
				}
			}
			drop(closure);
		}))
	}
}

/// Reads the routing-relevant parts of a DOM click.
fn click_event_from(event: &Event) -> ClickEvent {
	let mut click = ClickEvent {
		default_prevented: event.default_prevented(),
		..ClickEvent::default()
	};
	if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
		click.button = mouse.button();
		click.meta_key = mouse.meta_key();
		click.ctrl_key = mouse.ctrl_key();
		click.shift_key = mouse.shift_key();
	}
	click.anchor = event
		.target()
		.and_then(|target| target.dyn_into::<Element>().ok())
		.and_then(|element| element.closest("a").ok().flatten())
		.and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok())
		.map(|anchor| Anchor {
			href: anchor.has_attribute("href").then(|| anchor.href()),
			download: anchor.has_attribute("download"),
			target: Some(anchor.target()).filter(|t| !t.is_empty()),
			title: anchor.get_attribute("title"),
		});
	click
}

impl fmt::Debug for BrowserHost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrowserHost")
			.field("pending_timers", &self.pending_timers())
			.finish_non_exhaustive()
	}
}

impl NavigationHost for BrowserHost {
	fn current_url(&self) -> Option<String> {
		self.window.location().href().ok()
	}

	fn history_available(&self) -> bool {
		self.window.history().is_ok()
	}

	fn push_state(&self, url: &str, title: &str) -> Result<(), RouteError> {
		self.history()?
			.push_state_with_url(&JsValue::NULL, title, Some(url))
			.map_err(|e| RouteError::HistoryFailed(js_message(&e)))
	}

	fn replace_state(&self, url: &str, title: &str) -> Result<(), RouteError> {
		self.history()?
			.replace_state_with_url(&JsValue::NULL, title, Some(url))
			.map_err(|e| RouteError::HistoryFailed(js_message(&e)))
	}

	fn title(&self) -> String {
		self.document.title()
	}

	fn set_title(&self, title: &str) {
		self.document.set_title(title);
	}

	fn is_ready(&self) -> bool {
		self.document.ready_state() != "loading"
	}

	fn when_ready(&self, callback: Box<dyn FnOnce()>) {
		if self.is_ready() {
			callback();
			return;
		}
		let closure = Closure::once_into_js(move || callback());
		let options = web_sys::AddEventListenerOptions::new();
		options.set_once(true);
		if let Err(e) = self
			.document
			.add_event_listener_with_callback_and_add_event_listener_options(
				"DOMContentLoaded",
				closure.unchecked_ref(),
				&options,
			) {
			warn_log!("Failed to wait for DOMContentLoaded: {}", js_message(&e));
		}
	}

	fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
		let id = self.next_timer.get().checked_add(1).unwrap_or(1);
		self.next_timer.set(id);
		let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
		let timers = Rc::downgrade(&self.timers);
		let timeout = Timeout::new(millis, move || {
			let fired = timers
				.upgrade()
				.and_then(|timers| timers.borrow_mut().remove(&id));
			callback();
			// wasm-bindgen defers freeing a closure that is still running.
			drop(fired);
		});
		self.timers.borrow_mut().insert(id, timeout);
		TimerId::new(id)
	}

	fn clear_timeout(&self, timer: TimerId) {
		// Dropping a gloo timeout cancels it and frees its closure.
		let cleared = self.timers.borrow_mut().remove(&timer.raw());
		drop(cleared);
	}

	fn on_pop_state(&self, callback: Rc<dyn Fn()>) -> Result<HostListener, RouteError> {
		let closure = Closure::wrap(Box::new(move |_event: Event| {
			callback();
		}) as Box<dyn FnMut(_)>);
		self.listen(self.window.clone().into(), &["popstate", "hashchange"], closure)
	}

	fn on_link_click(
		&self,
		kind: ClickEventKind,
		callback: ClickHandler,
	) -> Result<HostListener, RouteError> {
		let closure = Closure::wrap(Box::new(move |event: Event| {
			let click = click_event_from(&event);
			if callback(&click) == ClickOutcome::Intercepted {
				debug_log!("Intercepted link click");
				event.prevent_default();
			}
		}) as Box<dyn FnMut(_)>);
		let events: &'static [&'static str] = match kind {
			ClickEventKind::Click => &["click"],
			ClickEventKind::TouchStart => &["touchstart"],
		};
		self.listen(self.document.clone().into(), events, closure)
	}
}
