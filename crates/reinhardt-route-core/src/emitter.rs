//! Reentrant-safe emission queue and debouncing.
//!
//! A route handler may navigate again while the current path is being
//! dispatched (a redirect). Such nested emissions are queued behind the one
//! in progress and drained by the outermost caller, so a redirect chain
//! settles before control returns. The queue accepts at most `max_depth`
//! emissions per burst; the rest are dropped, which breaks redirect cycles.

use crate::host::{NavigationHost, TimerId};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Weak;
use std::time::Duration;

/// Outcome of offering an emission to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
	/// First emission of a burst: the caller must drain the queue.
	Root,
	/// Queued behind an emission in progress.
	Nested,
	/// Depth limit reached; discarded.
	Dropped,
}

/// A queued emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Emission {
	/// Reads the host URL; `force` broadcasts even an unchanged path.
	Current { force: bool },
	/// Broadcasts the given path as is (hosts without a history API).
	Path(String),
}

#[derive(Debug)]
pub(crate) struct EmitQueue {
	pending: RefCell<VecDeque<Emission>>,
	depth: Cell<usize>,
	max_depth: usize,
}

impl EmitQueue {
	pub(crate) fn new(max_depth: usize) -> Self {
		Self {
			pending: RefCell::new(VecDeque::new()),
			depth: Cell::new(0),
			max_depth,
		}
	}

	/// Queues an emission.
	pub(crate) fn enqueue(&self, emission: Emission) -> Admission {
		let depth = self.depth.get();
		if depth >= self.max_depth {
			return Admission::Dropped;
		}
		self.depth.set(depth + 1);
		self.pending.borrow_mut().push_back(emission);
		if depth == 0 {
			Admission::Root
		} else {
			Admission::Nested
		}
	}

	/// Pops the oldest queued emission.
	pub(crate) fn next(&self) -> Option<Emission> {
		self.pending.borrow_mut().pop_front()
	}

	/// Starts a drain; dropping the guard ends the burst.
	pub(crate) fn burst(&self) -> BurstGuard<'_> {
		BurstGuard { queue: self }
	}

	pub(crate) fn depth(&self) -> usize {
		self.depth.get()
	}
}

/// Resets the queue when a burst ends, including by unwinding.
pub(crate) struct BurstGuard<'a> {
	queue: &'a EmitQueue,
}

impl Drop for BurstGuard<'_> {
	fn drop(&mut self) {
		self.queue.pending.borrow_mut().clear();
		self.queue.depth.set(0);
	}
}

/// Coalesces calls made within `delay` of each other into the last one.
pub(crate) struct Debouncer {
	host: Weak<dyn NavigationHost>,
	delay: Duration,
	pending: Cell<Option<TimerId>>,
}

impl Debouncer {
	pub(crate) fn new(host: Weak<dyn NavigationHost>, delay: Duration) -> Self {
		Self {
			host,
			delay,
			pending: Cell::new(None),
		}
	}

	/// Cancels the pending call, if any, and schedules `callback`.
	pub(crate) fn call(&self, callback: Box<dyn FnOnce()>) {
		let Some(host) = self.host.upgrade() else {
			return;
		};
		if let Some(timer) = self.pending.take() {
			host.clear_timeout(timer);
		}
		self.pending.set(Some(host.set_timeout(self.delay, callback)));
	}

	/// Cancels the pending call, if any.
	pub(crate) fn cancel(&self) {
		if let (Some(timer), Some(host)) = (self.pending.take(), self.host.upgrade()) {
			host.clear_timeout(timer);
		}
	}
}
