//! Router runtime: base, parsers, emission pipeline and host wiring.

use crate::click;
use crate::config::RouterConfig;
use crate::emitter::{Admission, Debouncer, EmitQueue, Emission};
use crate::error::RouteError;
use crate::host::{ClickEvent, ClickOutcome, HostListener, NavigationHost, TimerId};
use crate::observable::Observable;
use crate::parser::{Parsers, PrimaryParser, RouteArgs, SecondaryParser};
use crate::path::{normalize, path_from_base};
use crate::query::parse_query;
use crate::router::{EMIT_EVENT, Router, STOP_EVENT};
use crate::{debug_log, error_log, info_log};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// State shared by a runtime and every router created from it.
pub(crate) struct RuntimeShared {
	host: Rc<dyn NavigationHost>,
	config: RouterConfig,
	base: RefCell<String>,
	/// Last emitted canonical path.
	current: RefCell<String>,
	bus: Observable<str>,
	parsers: RefCell<Parsers>,
	route_found: Cell<bool>,
	queue: EmitQueue,
	debouncer: Debouncer,
	started: Cell<bool>,
	/// Bumped by every stop; a deferred start only wires if it still matches.
	generation: Cell<u64>,
	start_timer: Cell<Option<TimerId>>,
	wiring: RefCell<Vec<HostListener>>,
}

impl RuntimeShared {
	pub(crate) fn bus(&self) -> &Observable<str> {
		&self.bus
	}

	pub(crate) fn host(&self) -> &Rc<dyn NavigationHost> {
		&self.host
	}

	pub(crate) fn base(&self) -> String {
		self.base.borrow().clone()
	}

	pub(crate) fn parsers(&self) -> Parsers {
		self.parsers.borrow().clone()
	}

	pub(crate) fn mark_route_found(&self) {
		self.route_found.set(true);
	}

	/// Canonical path of the host's current URL.
	fn canonical_path(&self) -> String {
		let href = self.host.current_url().unwrap_or_default();
		let base = self.base.borrow();
		normalize(path_from_base(&href, &base)).to_string()
	}

	/// Queues an emission; the outermost call drains the queue.
	pub(crate) fn emit(&self, force: bool) {
		self.submit(Emission::Current { force });
	}

	fn submit(&self, emission: Emission) {
		match self.queue.enqueue(emission) {
			Admission::Dropped => {
				debug_log!("Dropped emission at depth {}", self.queue.depth());
			}
			Admission::Nested => {}
			Admission::Root => {
				let _burst = self.queue.burst();
				while let Some(emission) = self.queue.next() {
					match emission {
						Emission::Current { force } => self.emit_entry(force),
						Emission::Path(path) => {
							self.bus.trigger(EMIT_EVENT, &path);
						}
					}
				}
			}
		}
	}

	fn emit_entry(&self, force: bool) {
		let path = self.canonical_path();
		let changed = *self.current.borrow() != path;
		if force || changed {
			debug_log!("Emitting path {:?}", path);
			self.bus.trigger(EMIT_EVENT, &path);
			*self.current.borrow_mut() = path;
		}
	}

	pub(crate) fn navigate(&self, path: &str, title: Option<&str>, replace: bool) -> bool {
		match self.try_navigate(path, title, replace) {
			Ok(found) => found,
			Err(e) => {
				error_log!("Navigation to {:?} failed: {}", path, e);
				false
			}
		}
	}

	pub(crate) fn try_navigate(
		&self,
		path: &str,
		title: Option<&str>,
		replace: bool,
	) -> Result<bool, RouteError> {
		let base = self.base();

		if !self.host.history_available() {
			let relative = path.split_once(base.as_str()).map_or(path, |(_, rest)| rest);
			self.route_found.set(false);
			self.submit(Emission::Path(normalize(relative).to_string()));
			return Ok(self.route_found.get());
		}

		let url = format!("{base}{}", normalize(path));
		let title = match title {
			Some(title) if !title.is_empty() => title.to_string(),
			_ => self.host.title(),
		};
		if replace {
			self.host.replace_state(&url, &title)?;
		} else {
			self.host.push_state(&url, &title)?;
		}
		self.host.set_title(&title);

		self.route_found.set(false);
		self.emit(false);
		Ok(self.route_found.get())
	}

	fn start(self: &Rc<Self>, auto_exec: bool) -> Result<(), RouteError> {
		if self.started.replace(true) {
			return Ok(());
		}

		if self.host.is_ready() {
			return self.wire(auto_exec).inspect_err(|_| self.started.set(false));
		}

		let generation = self.generation.get();
		let this = Rc::downgrade(self);
		self.host.when_ready(Box::new(move || {
			let Some(shared) = this.upgrade() else {
				return;
			};
			if shared.generation.get() != generation {
				return;
			}
			let this = Rc::downgrade(&shared);
			let timer = shared.host.set_timeout(
				shared.config.start_delay(),
				Box::new(move || {
					let Some(shared) = this.upgrade() else {
						return;
					};
					if shared.generation.get() != generation {
						return;
					}
					shared.start_timer.set(None);
					if let Err(e) = shared.wire(auto_exec) {
						error_log!("Deferred router start failed: {}", e);
						shared.started.set(false);
					}
				}),
			);
			shared.start_timer.set(Some(timer));
		}));
		Ok(())
	}

	/// Attaches the popstate/hashchange and click listeners.
	fn wire(self: &Rc<Self>, auto_exec: bool) -> Result<(), RouteError> {
		let this = Rc::downgrade(self);
		let pop = self.host.on_pop_state(Rc::new(move || {
			if let Some(shared) = this.upgrade() {
				let target: Weak<RuntimeShared> = Rc::downgrade(&shared);
				shared.debouncer.call(Box::new(move || {
					if let Some(shared) = target.upgrade() {
						shared.emit(false);
					}
				}));
			}
		}))?;

		let this = Rc::downgrade(self);
		let click = self.host.on_link_click(
			self.config.click_event,
			Rc::new(move |event: &ClickEvent| match this.upgrade() {
				Some(shared) => click::intercept(&shared, event),
				None => ClickOutcome::Native,
			}),
		)?;

		self.wiring.borrow_mut().extend([pop, click]);
		info_log!("Router started with base {:?}", self.base());

		if auto_exec {
			self.emit(true);
		}
		Ok(())
	}

	fn stop(&self) {
		if !self.started.replace(false) {
			return;
		}
		self.generation.set(self.generation.get() + 1);
		if let Some(timer) = self.start_timer.take() {
			self.host.clear_timeout(timer);
		}
		self.debouncer.cancel();
		let wiring = std::mem::take(&mut *self.wiring.borrow_mut());
		drop(wiring);
		self.bus.trigger(STOP_EVENT, "");
		info_log!("Router stopped");
	}
}

/// A routing context: one host, one base, one set of parsers, and every
/// router created from it.
///
/// Handles are cheap to clone and share state.
///
/// ```
/// use reinhardt_route_core::RouterRuntime;
/// use reinhardt_route_core::host::MemoryHost;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let runtime = RouterRuntime::with_host(MemoryHost::new("http://localhost/")).unwrap();
/// let seen = Rc::new(RefCell::new(None));
/// let sink = seen.clone();
/// runtime.route().register("/profile/:user", move |args| {
///     *sink.borrow_mut() = args.get("user").map(str::to_string);
/// });
///
/// assert!(runtime.navigate("/profile/alice"));
/// assert_eq!(seen.borrow().as_deref(), Some("alice"));
/// assert!(!runtime.navigate("/unknown"));
/// ```
#[derive(Clone)]
pub struct RouterRuntime {
	shared: Rc<RuntimeShared>,
	main: Router,
}

impl RouterRuntime {
	/// Creates a runtime on `host`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::InvalidConfig`] if `config` fails validation.
	pub fn new(host: Rc<dyn NavigationHost>, config: RouterConfig) -> Result<Self, RouteError> {
		config.validate()?;
		Ok(Self::build(host, config))
	}

	/// Creates a runtime on `host` with the default configuration.
	///
	/// # Errors
	///
	/// See [`RouterRuntime::new`].
	pub fn with_host(host: impl NavigationHost + 'static) -> Result<Self, RouteError> {
		Self::new(Rc::new(host), RouterConfig::default())
	}

	pub(crate) fn build(host: Rc<dyn NavigationHost>, config: RouterConfig) -> Self {
		let base = config.effective_base().to_string();
		let debouncer = Debouncer::new(Rc::downgrade(&host), config.debounce());
		let shared = Rc::new(RuntimeShared {
			queue: EmitQueue::new(config.max_emit_depth.max(1)),
			debouncer,
			host,
			config,
			base: RefCell::new(base),
			current: RefCell::new(String::new()),
			bus: Observable::new(),
			parsers: RefCell::new(Parsers::default()),
			route_found: Cell::new(false),
			started: Cell::new(false),
			generation: Cell::new(0),
			start_timer: Cell::new(None),
			wiring: RefCell::new(Vec::new()),
		});
		*shared.current.borrow_mut() = shared.canonical_path();
		let main = Router::new(&shared);
		Self { shared, main }
	}

	/// The main router.
	pub fn route(&self) -> Router {
		self.main.clone()
	}

	/// Creates an isolated router subscribed to this runtime.
	pub fn create(&self) -> Router {
		Router::new(&self.shared)
	}

	/// Sets the base (`None` or `""` restore `"#"`) and re-reads the current
	/// path against it without emitting.
	pub fn base(&self, base: Option<&str>) {
		let base = match base {
			Some(base) if !base.is_empty() => base.to_string(),
			_ => crate::config::DEFAULT_BASE.to_string(),
		};
		*self.shared.base.borrow_mut() = base;
		let path = self.shared.canonical_path();
		*self.shared.current.borrow_mut() = path;
	}

	/// The active base.
	pub fn current_base(&self) -> String {
		self.shared.base()
	}

	/// Replaces the primary and/or secondary parser. Passing neither restores
	/// both built-ins.
	pub fn parser(&self, primary: Option<PrimaryParser>, secondary: Option<SecondaryParser>) {
		let mut parsers = self.shared.parsers.borrow_mut();
		if primary.is_none() && secondary.is_none() {
			*parsers = Parsers::default();
			return;
		}
		if let Some(primary) = primary {
			parsers.primary = primary;
		}
		if let Some(secondary) = secondary {
			parsers.secondary = secondary;
		}
	}

	/// Restores the built-in parsers.
	pub fn reset_parsers(&self) {
		self.parser(None, None);
	}

	/// Pushes `path` onto the history and dispatches it.
	///
	/// Returns whether any router matched. Host failures are logged and
	/// reported as `false`; use [`RouterRuntime::try_navigate`] to observe them.
	pub fn navigate(&self, path: &str) -> bool {
		self.shared.navigate(path, None, false)
	}

	/// Navigates with an explicit title and history mode.
	pub fn navigate_with(&self, path: &str, title: Option<&str>, replace: bool) -> bool {
		self.shared.navigate(path, title, replace)
	}

	/// Like [`RouterRuntime::navigate_with`], surfacing host failures.
	///
	/// # Errors
	///
	/// Returns the host's error if the history entry could not be written.
	pub fn try_navigate(
		&self,
		path: &str,
		title: Option<&str>,
		replace: bool,
	) -> Result<bool, RouteError> {
		self.shared.try_navigate(path, title, replace)
	}

	/// Query parameters of the current URL.
	pub fn query(&self) -> HashMap<String, String> {
		parse_query(&self.shared.host.current_url().unwrap_or_default())
	}

	/// Starts listening for history changes and link clicks.
	///
	/// Idempotent. While the document is still loading, wiring is deferred
	/// until it becomes interactive plus the configured start delay. With
	/// `auto_exec`, the current path is dispatched once wired.
	///
	/// # Errors
	///
	/// Returns [`RouteError::ListenerFailed`] if the host refuses a listener.
	pub fn start(&self, auto_exec: bool) -> Result<(), RouteError> {
		self.shared.start(auto_exec)
	}

	/// Detaches the listeners and clears every router of this runtime.
	/// Idempotent.
	pub fn stop(&self) {
		self.shared.stop();
	}

	/// Dispatches the current path even if it did not change.
	pub fn exec(&self) {
		self.shared.emit(true);
	}

	/// Dispatches the current path if it changed since the last emission.
	pub fn emit(&self) {
		self.shared.emit(false);
	}

	/// Whether [`RouterRuntime::start`] is in effect.
	pub fn is_started(&self) -> bool {
		self.shared.started.get()
	}

	/// The last dispatched canonical path.
	pub fn current_path(&self) -> String {
		self.shared.current.borrow().clone()
	}

	/// Whether the last navigation found a route.
	pub fn route_found(&self) -> bool {
		self.shared.route_found.get()
	}

	/// The navigation host.
	pub fn host(&self) -> Rc<dyn NavigationHost> {
		Rc::clone(&self.shared.host)
	}

	/// The configuration the runtime was built with.
	pub fn config(&self) -> &RouterConfig {
		&self.shared.config
	}

	/// Runs the link-click policy on `event`.
	pub fn intercept_click(&self, event: &ClickEvent) -> ClickOutcome {
		click::intercept(&self.shared, event)
	}

	/// Number of live routers, the main router included.
	pub fn router_count(&self) -> usize {
		self.shared.bus.listener_count(EMIT_EVENT)
	}

	/// Matches `path` with the active secondary parser, as routers do.
	pub fn match_filter(&self, path: &str, filter: &str) -> Option<RouteArgs> {
		let parsers = self.shared.parsers();
		(parsers.secondary)(normalize(path), normalize(filter))
	}
}

impl fmt::Debug for RouterRuntime {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterRuntime")
			.field("base", &self.shared.base())
			.field("current", &self.current_path())
			.field("started", &self.is_started())
			.field("routers", &self.router_count())
			.finish()
	}
}
