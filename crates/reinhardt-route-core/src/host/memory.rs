//! In-memory navigation host.

use super::{ClickEvent, ClickHandler, ClickOutcome, HostListener, NavigationHost, TimerId};
use crate::config::ClickEventKind;
use crate::error::RouteError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use url::Url;

// Upper bound on timers fired by `run_until_idle`, so a self-rescheduling
// callback cannot spin forever.
const MAX_IDLE_ROUNDS: usize = 10_000;

type Timer = (Duration, Box<dyn FnOnce()>);

struct MemoryState {
	entries: Vec<String>,
	index: usize,
	title: String,
	ready: bool,
	ready_callbacks: Vec<Box<dyn FnOnce()>>,
	now: Duration,
	next_timer: i32,
	timers: BTreeMap<i32, Timer>,
	next_listener: u64,
	pop_listeners: Vec<(u64, Rc<dyn Fn()>)>,
	click_listeners: Vec<(u64, ClickEventKind, ClickHandler)>,
}

impl MemoryState {
	fn current(&self) -> &str {
		&self.entries[self.index]
	}

	fn push(&mut self, url: String) {
		self.entries.truncate(self.index + 1);
		self.entries.push(url);
		self.index = self.entries.len() - 1;
	}

	fn pop_snapshot(&self) -> Vec<Rc<dyn Fn()>> {
		self.pop_listeners.iter().map(|(_, cb)| Rc::clone(cb)).collect()
	}

	/// Removes and returns the earliest timer due at or before `until`.
	fn take_due(&mut self, until: Option<Duration>) -> Option<Timer> {
		let id = self
			.timers
			.iter()
			.filter(|(_, (due, _))| until.is_none_or(|limit| *due <= limit))
			.min_by_key(|(id, (due, _))| (*due, **id))
			.map(|(id, _)| *id)?;
		self.timers.remove(&id)
	}
}

/// Session history, document state and timers held in memory.
///
/// Timers only fire when the test (or embedding) advances the virtual clock
/// with [`MemoryHost::advance`] or [`MemoryHost::run_until_idle`]. Clones
/// share the same state.
///
/// ```
/// use reinhardt_route_core::host::{MemoryHost, NavigationHost};
///
/// let host = MemoryHost::new("http://localhost/");
/// host.push_state("#users", "Users").unwrap();
/// assert_eq!(host.current_url().as_deref(), Some("http://localhost/#users"));
/// host.back();
/// assert_eq!(host.current_url().as_deref(), Some("http://localhost/"));
/// ```
#[derive(Clone)]
pub struct MemoryHost {
	state: Rc<RefCell<MemoryState>>,
}

impl MemoryHost {
	/// Creates a ready document at `url`.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			state: Rc::new(RefCell::new(MemoryState {
				entries: vec![url.into()],
				index: 0,
				title: String::new(),
				ready: true,
				ready_callbacks: Vec::new(),
				now: Duration::ZERO,
				next_timer: 1,
				timers: BTreeMap::new(),
				next_listener: 0,
				pop_listeners: Vec::new(),
				click_listeners: Vec::new(),
			})),
		}
	}

	/// Creates a document at `url` that is still loading.
	pub fn loading(url: impl Into<String>) -> Self {
		let host = Self::new(url);
		host.state.borrow_mut().ready = false;
		host
	}

	/// Marks the document ready and runs the queued ready callbacks.
	pub fn set_ready(&self) {
		let callbacks = {
			let mut state = self.state.borrow_mut();
			state.ready = true;
			std::mem::take(&mut state.ready_callbacks)
		};
		for callback in callbacks {
			callback();
		}
	}

	/// Replaces the current entry without firing any event, like a page load.
	pub fn set_url(&self, url: impl Into<String>) {
		let mut state = self.state.borrow_mut();
		let index = state.index;
		state.entries[index] = url.into();
	}

	/// Changes the fragment, pushing an entry and firing `hashchange`.
	pub fn set_hash(&self, hash: &str) {
		let next = {
			let state = self.state.borrow();
			let current = state.current();
			let head = current.split_once('#').map_or(current, |(head, _)| head);
			format!("{head}#{}", hash.trim_start_matches('#'))
		};
		self.state.borrow_mut().push(next);
		self.fire_pop_state();
	}

	/// Goes one entry back, firing `popstate`. Returns `false` at the start.
	pub fn back(&self) -> bool {
		{
			let mut state = self.state.borrow_mut();
			if state.index == 0 {
				return false;
			}
			state.index -= 1;
		}
		self.fire_pop_state();
		true
	}

	/// Goes one entry forward, firing `popstate`. Returns `false` at the end.
	pub fn forward(&self) -> bool {
		{
			let mut state = self.state.borrow_mut();
			if state.index + 1 >= state.entries.len() {
				return false;
			}
			state.index += 1;
		}
		self.fire_pop_state();
		true
	}

	/// Dispatches a `click` to the document.
	pub fn click(&self, event: &ClickEvent) -> ClickOutcome {
		self.dispatch_click(ClickEventKind::Click, event)
	}

	/// Dispatches a click-like DOM event to the document.
	///
	/// When no handler intercepts it, a click on a followable anchor performs
	/// the browser default: a fragment-only jump pushes an entry and fires
	/// `hashchange`; any other link replaces the document at that URL.
	pub fn dispatch_click(&self, kind: ClickEventKind, event: &ClickEvent) -> ClickOutcome {
		let handlers: Vec<ClickHandler> = self
			.state
			.borrow()
			.click_listeners
			.iter()
			.filter(|(_, listening, _)| *listening == kind)
			.map(|(_, _, cb)| Rc::clone(cb))
			.collect();

		let mut outcome = ClickOutcome::Native;
		for handler in handlers {
			if handler(event) == ClickOutcome::Intercepted {
				outcome = ClickOutcome::Intercepted;
			}
		}

		if outcome == ClickOutcome::Native && !event.default_prevented {
			self.follow(event);
		}
		outcome
	}

	fn follow(&self, event: &ClickEvent) {
		let Some(anchor) = &event.anchor else {
			return;
		};
		let Some(href) = &anchor.href else {
			return;
		};
		if anchor.download || anchor.target.as_deref().is_some_and(|t| t != "_self") {
			return;
		}
		let Ok(target) = self.resolve(href) else {
			return;
		};

		let same_document = {
			let state = self.state.borrow();
			let current = state.current();
			let strip = |url: &str| url.split_once('#').map_or(url, |(head, _)| head).to_string();
			strip(current) == strip(&target) && target.contains('#') && target != current
		};

		if same_document {
			self.state.borrow_mut().push(target);
			self.fire_pop_state();
		} else {
			self.state.borrow_mut().push(target);
		}
	}

	/// Moves the virtual clock forward, firing every timer that falls due.
	pub fn advance(&self, by: Duration) {
		let until = self.state.borrow().now + by;
		loop {
			let timer = self.state.borrow_mut().take_due(Some(until));
			let Some((due, callback)) = timer else {
				break;
			};
			self.state.borrow_mut().now = due;
			callback();
		}
		self.state.borrow_mut().now = until;
	}

	/// Fires timers until none remain.
	pub fn run_until_idle(&self) {
		for _ in 0..MAX_IDLE_ROUNDS {
			let timer = self.state.borrow_mut().take_due(None);
			let Some((due, callback)) = timer else {
				return;
			};
			{
				let mut state = self.state.borrow_mut();
				state.now = state.now.max(due);
			}
			callback();
		}
	}

	/// Number of scheduled, unfired timers.
	pub fn pending_timers(&self) -> usize {
		self.state.borrow().timers.len()
	}

	/// Number of session history entries.
	pub fn history_len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Every session history entry, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.state.borrow().entries.clone()
	}

	/// Number of attached popstate/hashchange listeners.
	pub fn pop_listener_count(&self) -> usize {
		self.state.borrow().pop_listeners.len()
	}

	/// Number of attached click listeners.
	pub fn click_listener_count(&self) -> usize {
		self.state.borrow().click_listeners.len()
	}

	fn resolve(&self, url: &str) -> Result<String, RouteError> {
		let current = self.state.borrow().current().to_string();
		let base = Url::parse(&current).map_err(|e| RouteError::HistoryFailed(e.to_string()))?;
		let resolved = base
			.join(url)
			.map_err(|e| RouteError::HistoryFailed(e.to_string()))?;
		if resolved.origin() != base.origin() {
			return Err(RouteError::HistoryFailed(format!(
				"{resolved} is not same-origin with {current}"
			)));
		}
		Ok(resolved.to_string())
	}

	fn fire_pop_state(&self) {
		let listeners = self.state.borrow().pop_snapshot();
		for listener in listeners {
			listener();
		}
	}

	fn next_listener_id(&self) -> u64 {
		let mut state = self.state.borrow_mut();
		let id = state.next_listener;
		state.next_listener += 1;
		id
	}
}

impl fmt::Debug for MemoryHost {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("MemoryHost")
			.field("url", &state.current())
			.field("history_len", &state.entries.len())
			.field("ready", &state.ready)
			.field("pending_timers", &state.timers.len())
			.finish()
	}
}

impl NavigationHost for MemoryHost {
	fn current_url(&self) -> Option<String> {
		Some(self.state.borrow().current().to_string())
	}

	fn history_available(&self) -> bool {
		true
	}

	fn push_state(&self, url: &str, _title: &str) -> Result<(), RouteError> {
		let resolved = self.resolve(url)?;
		self.state.borrow_mut().push(resolved);
		Ok(())
	}

	fn replace_state(&self, url: &str, _title: &str) -> Result<(), RouteError> {
		let resolved = self.resolve(url)?;
		let mut state = self.state.borrow_mut();
		let index = state.index;
		state.entries[index] = resolved;
		Ok(())
	}

	fn title(&self) -> String {
		self.state.borrow().title.clone()
	}

	fn set_title(&self, title: &str) {
		self.state.borrow_mut().title = title.to_string();
	}

	fn is_ready(&self) -> bool {
		self.state.borrow().ready
	}

	fn when_ready(&self, callback: Box<dyn FnOnce()>) {
		let ready = self.state.borrow().ready;
		if ready {
			callback();
		} else {
			self.state.borrow_mut().ready_callbacks.push(callback);
		}
	}

	fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
		let mut state = self.state.borrow_mut();
		let id = state.next_timer;
		state.next_timer += 1;
		let due = state.now + delay;
		state.timers.insert(id, (due, callback));
		TimerId::new(id)
	}

	fn clear_timeout(&self, timer: TimerId) {
		self.state.borrow_mut().timers.remove(&timer.raw());
	}

	fn on_pop_state(&self, callback: Rc<dyn Fn()>) -> Result<HostListener, RouteError> {
		let id = self.next_listener_id();
		self.state.borrow_mut().pop_listeners.push((id, callback));
		let state: Weak<RefCell<MemoryState>> = Rc::downgrade(&self.state);
		Ok(HostListener::new(move || {
			if let Some(state) = state.upgrade() {
				state.borrow_mut().pop_listeners.retain(|(existing, _)| *existing != id);
			}
		}))
	}

	fn on_link_click(
		&self,
		kind: ClickEventKind,
		callback: ClickHandler,
	) -> Result<HostListener, RouteError> {
		let id = self.next_listener_id();
		self.state
			.borrow_mut()
			.click_listeners
			.push((id, kind, callback));
		let state: Weak<RefCell<MemoryState>> = Rc::downgrade(&self.state);
		Ok(HostListener::new(move || {
			if let Some(state) = state.upgrade() {
				state
					.borrow_mut()
					.click_listeners
					.retain(|(existing, _, _)| *existing != id);
			}
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::Anchor;
	use rstest::rstest;
	use std::cell::Cell;

	fn counter() -> (Rc<Cell<u32>>, Rc<dyn Fn()>) {
		let hits = Rc::new(Cell::new(0));
		let inner = hits.clone();
		(hits, Rc::new(move || inner.set(inner.get() + 1)))
	}

	#[rstest]
	fn test_push_and_replace_resolve_relative_urls() {
		let host = MemoryHost::new("http://localhost/app/");
		host.push_state("users/42", "").unwrap();
		assert_eq!(host.current_url().as_deref(), Some("http://localhost/app/users/42"));

		host.replace_state("/about", "").unwrap();
		assert_eq!(host.current_url().as_deref(), Some("http://localhost/about"));
		assert_eq!(host.history_len(), 2);
	}

	#[rstest]
	fn test_push_state_rejects_cross_origin() {
		let host = MemoryHost::new("http://localhost/");
		let result = host.push_state("https://evil.example/", "");
		assert!(matches!(result, Err(RouteError::HistoryFailed(_))));
		assert_eq!(host.history_len(), 1);
	}

	#[rstest]
	fn test_push_truncates_forward_entries() {
		let host = MemoryHost::new("http://localhost/");
		host.push_state("#a", "").unwrap();
		host.push_state("#b", "").unwrap();
		host.back();
		host.push_state("#c", "").unwrap();
		assert_eq!(
			host.entries(),
			vec!["http://localhost/", "http://localhost/#a", "http://localhost/#c"]
		);
	}

	#[rstest]
	fn test_back_forward_fire_pop_state() {
		let host = MemoryHost::new("http://localhost/");
		let (hits, callback) = counter();
		let _guard = host.on_pop_state(callback).unwrap();
		host.push_state("#a", "").unwrap();

		assert!(host.back());
		assert!(!host.back());
		assert!(host.forward());
		assert!(!host.forward());

		assert_eq!(hits.get(), 2);
	}

	#[rstest]
	fn test_pop_listener_detaches_on_drop() {
		let host = MemoryHost::new("http://localhost/");
		let (hits, callback) = counter();
		let guard = host.on_pop_state(callback).unwrap();
		assert_eq!(host.pop_listener_count(), 1);

		drop(guard);
		host.set_hash("x");

		assert_eq!(host.pop_listener_count(), 0);
		assert_eq!(hits.get(), 0);
	}

	#[rstest]
	fn test_set_hash_replaces_fragment() {
		let host = MemoryHost::new("http://localhost/#old");
		host.set_hash("#new");
		assert_eq!(host.current_url().as_deref(), Some("http://localhost/#new"));
	}

	#[rstest]
	fn test_timers_fire_in_due_order() {
		let host = MemoryHost::new("http://localhost/");
		let log = Rc::new(RefCell::new(Vec::new()));
		for (label, ms) in [("late", 5), ("early", 1), ("mid", 3)] {
			let log = log.clone();
			host.set_timeout(
				Duration::from_millis(ms),
				Box::new(move || log.borrow_mut().push(label)),
			);
		}

		host.advance(Duration::from_millis(3));
		assert_eq!(*log.borrow(), vec!["early", "mid"]);

		host.run_until_idle();
		assert_eq!(*log.borrow(), vec!["early", "mid", "late"]);
	}

	#[rstest]
	fn test_clear_timeout() {
		let host = MemoryHost::new("http://localhost/");
		let (hits, callback) = counter();
		let timer = host.set_timeout(Duration::ZERO, Box::new(move || callback()));
		host.clear_timeout(timer);
		host.run_until_idle();
		assert_eq!(hits.get(), 0);
	}

	#[rstest]
	fn test_loading_document_defers_ready_callbacks() {
		let host = MemoryHost::loading("http://localhost/");
		let (hits, callback) = counter();
		host.when_ready(Box::new(move || callback()));
		assert!(!host.is_ready());
		assert_eq!(hits.get(), 0);

		host.set_ready();
		assert_eq!(hits.get(), 1);
	}

	#[rstest]
	fn test_unintercepted_hash_link_fires_hashchange() {
		let host = MemoryHost::new("http://localhost/");
		let (hits, callback) = counter();
		let _guard = host.on_pop_state(callback).unwrap();

		let outcome = host.click(&ClickEvent::on(Anchor::new("http://localhost/#top")));

		assert_eq!(outcome, ClickOutcome::Native);
		assert_eq!(host.current_url().as_deref(), Some("http://localhost/#top"));
		assert_eq!(hits.get(), 1);
	}

	#[rstest]
	fn test_intercepted_click_does_not_navigate() {
		let host = MemoryHost::new("http://localhost/");
		let _guard = host
			.on_link_click(ClickEventKind::Click, Rc::new(|_| ClickOutcome::Intercepted))
			.unwrap();

		let outcome = host.click(&ClickEvent::on(Anchor::new("http://localhost/other")));

		assert_eq!(outcome, ClickOutcome::Intercepted);
		assert_eq!(host.history_len(), 1);
	}

	#[rstest]
	fn test_click_kind_filters_listeners() {
		let host = MemoryHost::new("http://localhost/");
		let _guard = host
			.on_link_click(ClickEventKind::TouchStart, Rc::new(|_| ClickOutcome::Intercepted))
			.unwrap();

		let outcome = host.click(&ClickEvent::on(Anchor::new("http://localhost/other")));
		assert_eq!(outcome, ClickOutcome::Native);
		assert_eq!(host.click_listener_count(), 1);
	}
}
