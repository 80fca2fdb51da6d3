//! Thread-local default runtime and its free-function facade.
//!
//! Most applications have a single routing context; these functions reach
//! it without threading a [`RouterRuntime`] handle through the UI tree. The
//! default runtime is created lazily on first use: on `wasm32` it binds to the
//! browser document, elsewhere it uses a [`StaticHost`].
//!
//! ```
//! use reinhardt_route_core::global;
//!
//! global::register("/about", |_| {});
//! assert!(global::navigate("/about"));
//! global::reset_runtime();
//! ```

use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::host::{NavigationHost, StaticHost};
use crate::parser::{PrimaryParser, RouteArgs, SecondaryParser};
use crate::router::Router;
use crate::runtime::RouterRuntime;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// In WASM there is only one thread, so this is effectively a process-wide
// router. Native threads each get their own.
thread_local! {
	static RUNTIME: RefCell<Option<RouterRuntime>> = const { RefCell::new(None) };
}

#[cfg(target_arch = "wasm32")]
fn default_host() -> Rc<dyn NavigationHost> {
	match crate::host::BrowserHost::new() {
		Ok(host) => Rc::new(host),
		Err(e) => {
			crate::warn_log!("Falling back to a static host: {}", e);
			Rc::new(StaticHost::new())
		}
	}
}

#[cfg(not(target_arch = "wasm32"))]
fn default_host() -> Rc<dyn NavigationHost> {
	Rc::new(StaticHost::new())
}

/// Runs `f` with the default runtime, creating it on first use.
///
/// The runtime handle is cloned out of the thread-local slot first, so `f`
/// may itself call back into this module.
pub fn with_runtime<F, R>(f: F) -> R
where
	F: FnOnce(&RouterRuntime) -> R,
{
	let runtime = RUNTIME.with(|slot| {
		slot.borrow_mut()
			.get_or_insert_with(|| RouterRuntime::build(default_host(), RouterConfig::default()))
			.clone()
	});
	f(&runtime)
}

/// Replaces the default runtime, returning the previous one.
pub fn install_runtime(runtime: RouterRuntime) -> Option<RouterRuntime> {
	RUNTIME.with(|slot| slot.borrow_mut().replace(runtime))
}

/// Stops and removes the default runtime; the next call creates a fresh one.
pub fn reset_runtime() {
	if let Some(runtime) = RUNTIME.with(|slot| slot.borrow_mut().take()) {
		runtime.stop();
	}
}

/// Navigates the default runtime; see [`RouterRuntime::navigate`].
pub fn navigate(path: &str) -> bool {
	with_runtime(|runtime| runtime.navigate(path))
}

/// Navigates the default runtime with a title and history mode.
pub fn navigate_with(path: &str, title: Option<&str>, replace: bool) -> bool {
	with_runtime(|runtime| runtime.navigate_with(path, title, replace))
}

/// Binds `action` to `filter` on the main router.
pub fn register<F>(filter: &str, action: F)
where
	F: Fn(&RouteArgs) + 'static,
{
	with_runtime(|runtime| {
		runtime.route().register(filter, action);
	});
}

/// Binds `action` to the main router's default route.
pub fn register_default<F>(action: F)
where
	F: Fn(&RouteArgs) + 'static,
{
	with_runtime(|runtime| {
		runtime.route().register_default(action);
	});
}

/// The main router of the default runtime.
pub fn route() -> Router {
	with_runtime(RouterRuntime::route)
}

/// Creates a router on the default runtime.
pub fn create() -> Router {
	with_runtime(RouterRuntime::create)
}

/// Sets the base of the default runtime.
pub fn base(base: Option<&str>) {
	with_runtime(|runtime| runtime.base(base));
}

/// Replaces the parsers of the default runtime.
pub fn parser(primary: Option<PrimaryParser>, secondary: Option<SecondaryParser>) {
	with_runtime(|runtime| runtime.parser(primary, secondary));
}

/// Query parameters of the current URL.
pub fn query() -> HashMap<String, String> {
	with_runtime(RouterRuntime::query)
}

/// Starts the default runtime.
///
/// # Errors
///
/// See [`RouterRuntime::start`].
pub fn start(auto_exec: bool) -> Result<(), RouteError> {
	with_runtime(|runtime| runtime.start(auto_exec))
}

/// Stops the default runtime and clears all of its routers.
pub fn stop() {
	with_runtime(RouterRuntime::stop);
}

/// Dispatches the current path on the default runtime.
pub fn exec() {
	with_runtime(RouterRuntime::exec);
}
