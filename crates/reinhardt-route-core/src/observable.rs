//! Minimal publish/subscribe primitive.
//!
//! [`Observable`] is a single-threaded event table keyed by event name. It
//! backs both the runtime bus that broadcasts path changes and each
//! [`Router`](crate::Router)'s filter → action table.
//!
//! Listeners always receive `(event, args)`. For regular listeners `event` is
//! the name they registered for; listeners on the wildcard event (`"*"`) see
//! the name of whichever event was triggered.
//!
//! ```
//! use reinhardt_route_core::Observable;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let events: Observable<str> = Observable::new();
//! let hits = Rc::new(Cell::new(0));
//! let counter = hits.clone();
//! events.on("emit", move |_, path| {
//!     assert_eq!(path, "users/42");
//!     counter.set(counter.get() + 1);
//! });
//! events.trigger("emit", "users/42").trigger("emit", "users/42");
//! assert_eq!(hits.get(), 2);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Event name that receives every other event, and that clears the whole
/// table when passed to [`Observable::off`].
pub const WILDCARD: &str = "*";

/// Handle identifying one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Callback<A> = Rc<dyn Fn(&str, &A)>;

struct Registry<A: ?Sized> {
	next_id: u64,
	callbacks: HashMap<String, Vec<(ListenerId, Callback<A>)>>,
}

impl<A: ?Sized> Registry<A> {
	fn allocate(&mut self) -> ListenerId {
		let id = ListenerId(self.next_id);
		self.next_id += 1;
		id
	}

	fn snapshot(&self, event: &str) -> Vec<Callback<A>> {
		self.callbacks
			.get(event)
			.map(|list| list.iter().map(|(_, cb)| Rc::clone(cb)).collect())
			.unwrap_or_default()
	}

	fn remove(&mut self, event: &str, id: ListenerId) {
		if let Some(list) = self.callbacks.get_mut(event) {
			list.retain(|(existing, _)| *existing != id);
			if list.is_empty() {
				self.callbacks.remove(event);
			}
		}
	}
}

/// Cheaply clonable handle to a shared event table.
pub struct Observable<A: ?Sized + 'static> {
	registry: Rc<RefCell<Registry<A>>>,
}

impl<A: ?Sized + 'static> Clone for Observable<A> {
	fn clone(&self) -> Self {
		Self {
			registry: Rc::clone(&self.registry),
		}
	}
}

impl<A: ?Sized + 'static> Default for Observable<A> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A: ?Sized + 'static> fmt::Debug for Observable<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let registry = self.registry.borrow();
		let mut events: Vec<_> = registry.callbacks.keys().collect();
		events.sort();
		f.debug_struct("Observable").field("events", &events).finish()
	}
}

impl<A: ?Sized + 'static> Observable<A> {
	/// Creates an empty event table.
	pub fn new() -> Self {
		Self {
			registry: Rc::new(RefCell::new(Registry {
				next_id: 0,
				callbacks: HashMap::new(),
			})),
		}
	}

	/// Registers `callback` for `event`, after any existing listeners.
	pub fn on<F>(&self, event: impl Into<String>, callback: F) -> ListenerId
	where
		F: Fn(&str, &A) + 'static,
	{
		let mut registry = self.registry.borrow_mut();
		let id = registry.allocate();
		registry
			.callbacks
			.entry(event.into())
			.or_default()
			.push((id, Rc::new(callback)));
		id
	}

	/// Registers `callback` for a single delivery of `event`.
	///
	/// The listener removes itself before `callback` runs, so a reentrant
	/// trigger from inside `callback` does not reach it again.
	pub fn one<F>(&self, event: impl Into<String>, callback: F) -> ListenerId
	where
		F: Fn(&str, &A) + 'static,
	{
		let event = event.into();
		let mut registry = self.registry.borrow_mut();
		let id = registry.allocate();
		let table: Weak<RefCell<Registry<A>>> = Rc::downgrade(&self.registry);
		let name = event.clone();
		let wrapper: Callback<A> = Rc::new(move |fired, args| {
			if let Some(table) = table.upgrade() {
				table.borrow_mut().remove(&name, id);
			}
			callback(fired, args);
		});
		registry.callbacks.entry(event).or_default().push((id, wrapper));
		id
	}

	/// Removes every listener of `event`, or of every event for `"*"`.
	pub fn off(&self, event: &str) -> &Self {
		let mut registry = self.registry.borrow_mut();
		if event == WILDCARD {
			registry.callbacks.clear();
		} else {
			registry.callbacks.remove(event);
		}
		self
	}

	/// Removes a single listener.
	pub fn off_listener(&self, event: &str, id: ListenerId) -> &Self {
		self.registry.borrow_mut().remove(event, id);
		self
	}

	/// Invokes the listeners of `event` in registration order, then the
	/// wildcard listeners (unless `event` is itself the wildcard).
	///
	/// Each list is snapshotted before dispatch: listeners added or removed
	/// by a callback take effect from the next trigger on.
	pub fn trigger(&self, event: &str, args: &A) -> &Self {
		let listeners = self.registry.borrow().snapshot(event);
		for callback in listeners {
			callback(event, args);
		}

		if event != WILDCARD {
			let wildcard = self.registry.borrow().snapshot(WILDCARD);
			for callback in wildcard {
				callback(event, args);
			}
		}
		self
	}

	/// Number of listeners registered for `event`.
	pub fn listener_count(&self, event: &str) -> usize {
		self.registry
			.borrow()
			.callbacks
			.get(event)
			.map_or(0, Vec::len)
	}

	/// Whether no listener is registered for any event.
	pub fn is_empty(&self) -> bool {
		self.registry.borrow().callbacks.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::{Cell, RefCell};

	fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&str, &str)>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let sink = log.clone();
		let make = move |tag: &'static str| -> Box<dyn Fn(&str, &str)> {
			let sink = sink.clone();
			Box::new(move |event: &str, args: &str| {
				sink.borrow_mut().push(format!("{tag}:{event}:{args}"));
			})
		};
		(log, make)
	}

	#[rstest]
	fn test_trigger_runs_in_insertion_order() {
		let events: Observable<str> = Observable::new();
		let (log, make) = recorder();
		let first = make("first");
		let second = make("second");
		events.on("go", move |e, a| first(e, a));
		events.on("go", move |e, a| second(e, a));

		events.trigger("go", "x");

		assert_eq!(*log.borrow(), vec!["first:go:x", "second:go:x"]);
	}

	#[rstest]
	fn test_wildcard_listener_sees_event_name() {
		let events: Observable<str> = Observable::new();
		let (log, make) = recorder();
		let all = make("all");
		events.on(WILDCARD, move |e, a| all(e, a));

		events.trigger("emit", "users");
		events.trigger(WILDCARD, "direct");

		assert_eq!(*log.borrow(), vec!["all:emit:users", "all:*:direct"]);
	}

	#[rstest]
	fn test_off_removes_event_listeners() {
		let events: Observable<str> = Observable::new();
		let hits = Rc::new(Cell::new(0));
		let counter = hits.clone();
		events.on("go", move |_, _| counter.set(counter.get() + 1));

		events.off("go").trigger("go", "");

		assert_eq!(hits.get(), 0);
		assert_eq!(events.listener_count("go"), 0);
	}

	#[rstest]
	fn test_off_wildcard_clears_everything() {
		let events: Observable<str> = Observable::new();
		events.on("a", |_, _| {});
		events.on("b", |_, _| {});
		events.on(WILDCARD, |_, _| {});

		events.off(WILDCARD);

		assert!(events.is_empty());
	}

	#[rstest]
	fn test_off_listener_removes_only_that_listener() {
		let events: Observable<str> = Observable::new();
		let hits = Rc::new(Cell::new(0));
		let a = hits.clone();
		let b = hits.clone();
		let first = events.on("go", move |_, _| a.set(a.get() + 1));
		events.on("go", move |_, _| b.set(b.get() + 10));

		events.off_listener("go", first).trigger("go", "");

		assert_eq!(hits.get(), 10);
	}

	#[rstest]
	fn test_one_fires_once() {
		let events: Observable<str> = Observable::new();
		let hits = Rc::new(Cell::new(0));
		let counter = hits.clone();
		events.one("go", move |_, _| counter.set(counter.get() + 1));

		events.trigger("go", "").trigger("go", "");

		assert_eq!(hits.get(), 1);
		assert_eq!(events.listener_count("go"), 0);
	}

	#[rstest]
	fn test_mutation_during_trigger_does_not_affect_current_dispatch() {
		let events: Observable<str> = Observable::new();
		let hits = Rc::new(Cell::new(0));
		let handle = events.clone();
		let counter = hits.clone();
		events.on("go", move |_, _| {
			let inner = counter.clone();
			handle.on("go", move |_, _| inner.set(inner.get() + 100));
			handle.off_listener("go", ListenerId(1));
		});
		let counter = hits.clone();
		events.on("go", move |_, _| counter.set(counter.get() + 1));

		events.trigger("go", "");

		// the second listener was removed mid-dispatch but still ran; the added one did not
		assert_eq!(hits.get(), 1);

		events.trigger("go", "");
		assert_eq!(hits.get(), 101);
	}

	#[rstest]
	fn test_reentrant_trigger() {
		let events: Observable<str> = Observable::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		let handle = events.clone();
		let sink = log.clone();
		events.on("outer", move |_, _| {
			sink.borrow_mut().push("outer".to_string());
			handle.trigger("inner", "");
		});
		let sink = log.clone();
		events.on("inner", move |_, _| sink.borrow_mut().push("inner".to_string()));

		events.trigger("outer", "");

		assert_eq!(*log.borrow(), vec!["outer", "inner"]);
	}
}
