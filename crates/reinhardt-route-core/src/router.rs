//! Per-region route tables.
//!
//! A [`Router`] is an ordered list of filters with callbacks bound to them.
//! Every router of a runtime receives every path change; each one dispatches
//! to its first matching filter independently of the others.

use crate::RouteError;
use crate::observable::{ListenerId, Observable, WILDCARD};
use crate::parser::{DEFAULT_ROUTE, RouteArgs};
use crate::path::normalize;
use crate::runtime::RuntimeShared;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Bus event carrying a changed canonical path.
pub(crate) const EMIT_EVENT: &str = "emit";

/// Bus event asking every router to clear itself.
pub(crate) const STOP_EVENT: &str = "stop";

/// Callback bound to a filter.
pub type RouteAction = Rc<dyn Fn(&RouteArgs)>;

/// The operations reachable through [`Router::call`].
#[derive(Clone)]
pub enum RouteCommand {
	/// Navigate to `path`.
	Navigate {
		/// Target path, relative to the base.
		path: String,
		/// Document title; the current title when `None`.
		title: Option<String>,
		/// Replace the current history entry instead of pushing one.
		replace: bool,
	},
	/// Bind `action` to `filter`.
	Register {
		/// Filter pattern.
		filter: String,
		/// Callback run on match.
		action: RouteAction,
	},
	/// Bind `action` to the default route.
	Default(RouteAction),
}

impl RouteCommand {
	/// Navigation to `path` with the current title.
	pub fn navigate(path: impl Into<String>) -> Self {
		Self::Navigate {
			path: path.into(),
			title: None,
			replace: false,
		}
	}

	/// Binding of `action` to `filter`.
	pub fn register(filter: impl Into<String>, action: impl Fn(&RouteArgs) + 'static) -> Self {
		Self::Register {
			filter: filter.into(),
			action: Rc::new(action),
		}
	}

	/// Binding of `action` to the default route.
	pub fn default_route(action: impl Fn(&RouteArgs) + 'static) -> Self {
		Self::Default(Rc::new(action))
	}
}

impl fmt::Debug for RouteCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Navigate {
				path,
				title,
				replace,
			} => f
				.debug_struct("Navigate")
				.field("path", path)
				.field("title", title)
				.field("replace", replace)
				.finish(),
			Self::Register { filter, .. } => f
				.debug_struct("Register")
				.field("filter", filter)
				.finish_non_exhaustive(),
			Self::Default(_) => f.write_str("Default(..)"),
		}
	}
}

/// Listeners a router holds on the runtime bus; removed on drop.
struct Subscription {
	bus: Observable<str>,
	emit: ListenerId,
	stop: ListenerId,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.bus
			.off_listener(EMIT_EVENT, self.emit)
			.off_listener(STOP_EVENT, self.stop);
	}
}

struct RouterInner {
	filters: RefCell<Vec<String>>,
	listeners: Observable<RouteArgs>,
	runtime: Weak<RuntimeShared>,
	_subscription: Subscription,
}

impl RouterInner {
	fn dispatch(&self, path: &str) -> bool {
		let Some(runtime) = self.runtime.upgrade() else {
			return false;
		};
		let parsers = runtime.parsers();
		let filters = self.filters.borrow().clone();
		let path = normalize(path);

		// The default route is only a candidate when something handles it.
		let fallback = (self.listeners.listener_count(DEFAULT_ROUTE) > 0).then_some(DEFAULT_ROUTE);

		for filter in filters.iter().map(String::as_str).chain(fallback) {
			let args = if filter == DEFAULT_ROUTE {
				(parsers.primary)(path)
			} else {
				(parsers.secondary)(path, normalize(filter))
			};
			if let Some(args) = args {
				self.listeners.trigger(filter, &args);
				runtime.mark_route_found();
				return true;
			}
		}
		false
	}

	fn stop(&self) {
		self.listeners.off(WILDCARD);
		self.filters.borrow_mut().clear();
	}
}

/// Handle to a route table. Clones share the table.
///
/// The router stays subscribed to its runtime until the last handle is
/// dropped. [`Router::stop`] empties it without unsubscribing, so it can be
/// reused.
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	pub(crate) fn new(runtime: &Rc<RuntimeShared>) -> Self {
		let bus = runtime.bus().clone();
		let inner = Rc::new_cyclic(|this: &Weak<RouterInner>| {
			let target = this.clone();
			let emit = bus.on(EMIT_EVENT, move |_, path| {
				if let Some(router) = target.upgrade() {
					router.dispatch(path);
				}
			});
			let target = this.clone();
			let stop = bus.on(STOP_EVENT, move |_, _| {
				if let Some(router) = target.upgrade() {
					router.stop();
				}
			});
			RouterInner {
				filters: RefCell::new(Vec::new()),
				listeners: Observable::new(),
				runtime: Rc::downgrade(runtime),
				_subscription: Subscription { bus, emit, stop },
			}
		});
		Self { inner }
	}

	/// Binds `action` to `filter`.
	///
	/// Filters are tried in registration order; the first match wins. `"@"`
	/// is the default route, tried after every other filter.
	pub fn register<F>(&self, filter: &str, action: F) -> &Self
	where
		F: Fn(&RouteArgs) + 'static,
	{
		let key = if filter == DEFAULT_ROUTE {
			DEFAULT_ROUTE.to_string()
		} else {
			let key = format!("/{}", normalize(filter));
			self.inner.filters.borrow_mut().push(key.clone());
			key
		};
		self.inner.listeners.on(key, move |_, args| action(args));
		self
	}

	/// Binds `action` to the default route, run when no filter matches.
	pub fn register_default<F>(&self, action: F) -> &Self
	where
		F: Fn(&RouteArgs) + 'static,
	{
		self.register(DEFAULT_ROUTE, action)
	}

	/// Matches `path` against this router alone and runs the winning actions.
	///
	/// Returns whether a filter matched.
	pub fn dispatch(&self, path: &str) -> bool {
		self.inner.dispatch(path)
	}

	/// Removes every filter and action.
	pub fn stop(&self) {
		self.inner.stop();
	}

	/// Navigates the owning runtime to `path`; see [`RouterRuntime::navigate`](crate::RouterRuntime::navigate).
	pub fn navigate(&self, path: &str) -> bool {
		self.navigate_with(path, None, false)
	}

	/// Navigates with an explicit title and history mode.
	pub fn navigate_with(&self, path: &str, title: Option<&str>, replace: bool) -> bool {
		match self.inner.runtime.upgrade() {
			Some(runtime) => runtime.navigate(path, title, replace),
			None => false,
		}
	}

	/// Like [`Router::navigate_with`], surfacing host failures.
	///
	/// # Errors
	///
	/// Returns [`RouteError::HostUnavailable`] if the runtime was dropped, or
	/// the host's error if the history update failed.
	pub fn try_navigate(
		&self,
		path: &str,
		title: Option<&str>,
		replace: bool,
	) -> Result<bool, RouteError> {
		let runtime = self
			.inner
			.runtime
			.upgrade()
			.ok_or_else(|| RouteError::HostUnavailable("router runtime dropped".to_string()))?;
		runtime.try_navigate(path, title, replace)
	}

	/// Runs a [`RouteCommand`]. Navigation reports whether a route matched.
	pub fn call(&self, command: RouteCommand) -> Option<bool> {
		match command {
			RouteCommand::Navigate {
				path,
				title,
				replace,
			} => Some(self.navigate_with(&path, title.as_deref(), replace)),
			RouteCommand::Register { filter, action } => {
				self.register(&filter, move |args| action(args));
				None
			}
			RouteCommand::Default(action) => {
				self.register_default(move |args| action(args));
				None
			}
		}
	}

	/// Registered filters in match order, as stored (`"/" + normalized`).
	pub fn filters(&self) -> Vec<String> {
		self.inner.filters.borrow().clone()
	}

	/// Whether a default route action is bound.
	pub fn has_default(&self) -> bool {
		self.inner.listeners.listener_count(DEFAULT_ROUTE) > 0
	}

	/// Whether both handles refer to the same table.
	pub fn ptr_eq(&self, other: &Router) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("filters", &self.inner.filters.borrow())
			.field("has_default", &self.has_default())
			.finish()
	}
}
