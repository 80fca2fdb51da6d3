//! Integration tests for navigation and dispatch
//!
//! These tests drive a runtime on an in-memory host.
//!
//! Success Criteria:
//! 1. Navigation pushes history and dispatches the canonical path
//! 2. Repeated navigation to the same path dispatches once
//! 3. Redirect chains settle and redirect loops terminate
//! 4. Hash and path bases, titles and history replacement
//! 5. Navigation without a history API

use reinhardt_route_core::host::{MemoryHost, NavigationHost, StaticHost};
use reinhardt_route_core::{RouteArgs, RouteError, RouterConfig, RouterRuntime};
use rstest::{fixture, rstest};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<RouteArgs>>>;

struct Harness {
	host: MemoryHost,
	runtime: RouterRuntime,
}

fn harness(url: &str, config: RouterConfig) -> Harness {
	let host = MemoryHost::new(url);
	let runtime = RouterRuntime::new(Rc::new(host.clone()), config).unwrap();
	Harness { host, runtime }
}

#[fixture]
fn hash() -> Harness {
	harness("http://localhost/", RouterConfig::default())
}

fn recorder() -> (Calls, impl Fn(&RouteArgs) + 'static) {
	let calls: Calls = Rc::new(RefCell::new(Vec::new()));
	let sink = calls.clone();
	(calls, move |args: &RouteArgs| sink.borrow_mut().push(args.clone()))
}

fn named(pairs: &[(&str, &str)]) -> RouteArgs {
	RouteArgs::Named(
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect::<HashMap<_, _>>(),
	)
}

/// Success Criterion 1: named placeholder dispatch under a hash base
#[rstest]
fn test_navigate_dispatches_named_args(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/profile/:user", action);

	assert!(hash.runtime.navigate("/profile/alice"));

	assert_eq!(*calls.borrow(), vec![named(&[("user", "alice")])]);
	assert_eq!(
		hash.host.current_url().as_deref(),
		Some("http://localhost/#profile/alice")
	);
	assert_eq!(hash.runtime.current_path(), "profile/alice");
}

/// Success Criterion 1: an unknown path reports no route
#[rstest]
fn test_navigate_unknown_path_without_default(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/profile/:user", action);

	assert!(!hash.runtime.navigate("/unknown"));
	assert!(calls.borrow().is_empty());
	assert!(!hash.runtime.route_found());
}

/// Success Criterion 1: the default route catches unknown paths
#[rstest]
fn test_navigate_unknown_path_with_default(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/profile/:user", |_| {});
	hash.runtime.route().register_default(action);

	assert!(hash.runtime.navigate("/unknown/deep"));
	assert_eq!(
		*calls.borrow(),
		vec![RouteArgs::Positional(vec!["unknown".into(), "deep".into()])]
	);
}

/// Success Criterion 1: earlier filters shadow later ones
#[rstest]
fn test_first_registered_filter_wins(hash: Harness) {
	let order = Rc::new(RefCell::new(Vec::new()));
	let sink = order.clone();
	hash.runtime
		.route()
		.register("/items/*", move |_| sink.borrow_mut().push("any"));
	let sink = order.clone();
	hash.runtime
		.route()
		.register("/items/new", move |_| sink.borrow_mut().push("new"));

	hash.runtime.navigate("/items/new");

	assert_eq!(*order.borrow(), vec!["any"]);
}

/// Success Criterion 2: the same path is dispatched once
#[rstest]
fn test_repeated_navigation_is_idempotent(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/home", action);

	assert!(hash.runtime.navigate("/home"));
	// Nothing dispatches the second time, so nothing is found either.
	assert!(!hash.runtime.navigate("home/"));

	assert_eq!(calls.borrow().len(), 1);
	assert_eq!(hash.host.history_len(), 3);
}

/// Success Criterion 2: exec re-dispatches the current path
#[rstest]
fn test_exec_forces_dispatch(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/home", action);
	hash.runtime.navigate("/home");

	hash.runtime.exec();

	assert_eq!(calls.borrow().len(), 2);
}

/// Success Criterion 3: a redirect inside a handler settles before returning
#[rstest]
fn test_redirect_chain_settles(hash: Harness) {
	let log = Rc::new(RefCell::new(Vec::new()));
	let runtime = hash.runtime.clone();
	let sink = log.clone();
	hash.runtime.route().register("/old", move |_| {
		sink.borrow_mut().push("old");
		runtime.navigate("/new");
	});
	let sink = log.clone();
	hash.runtime
		.route()
		.register("/new", move |_| sink.borrow_mut().push("new"));

	hash.runtime.navigate("/old");

	assert_eq!(*log.borrow(), vec!["old", "new"]);
	assert_eq!(hash.runtime.current_path(), "new");
}

/// Success Criterion 3: an A <-> B redirect loop stops at the depth cap
#[rstest]
fn test_redirect_loop_terminates(hash: Harness) {
	let a_calls = Rc::new(Cell::new(0));
	let b_calls = Rc::new(Cell::new(0));

	let runtime = hash.runtime.clone();
	let counter = a_calls.clone();
	hash.runtime.route().register("/a", move |_| {
		counter.set(counter.get() + 1);
		runtime.navigate("/b");
	});
	let runtime = hash.runtime.clone();
	let counter = b_calls.clone();
	hash.runtime.route().register("/b", move |_| {
		counter.set(counter.get() + 1);
		runtime.navigate("/a");
	});

	hash.runtime.navigate("/a");

	assert_eq!(a_calls.get(), 2);
	assert_eq!(b_calls.get(), 1);

	// The next burst starts from a fresh depth.
	hash.runtime.navigate("/b");
	assert!(b_calls.get() > 1);
}

/// Success Criterion 3: a custom depth cap is honored
#[rstest]
fn test_custom_emit_depth() {
	let h = harness(
		"http://localhost/",
		RouterConfig::new().with_max_emit_depth(1),
	);
	let log = Rc::new(RefCell::new(Vec::new()));
	let runtime = h.runtime.clone();
	let sink = log.clone();
	h.runtime.route().register("/old", move |_| {
		sink.borrow_mut().push("old");
		runtime.navigate("/new");
	});
	let sink = log.clone();
	h.runtime
		.route()
		.register("/new", move |_| sink.borrow_mut().push("new"));

	h.runtime.navigate("/old");

	assert_eq!(*log.borrow(), vec!["old"]);
}

/// Success Criterion 4: a hash-bang base
#[rstest]
fn test_hash_bang_base() {
	let h = harness(
		"http://localhost/index.html",
		RouterConfig::new().with_base("#!"),
	);
	let (calls, action) = recorder();
	h.runtime.route().register("/users/:id", action);

	assert!(h.runtime.navigate("users/7"));

	assert_eq!(
		h.host.current_url().as_deref(),
		Some("http://localhost/index.html#!users/7")
	);
	assert_eq!(*calls.borrow(), vec![named(&[("id", "7")])]);
}

/// Success Criterion 4: a root path base
#[rstest]
fn test_path_base() {
	let h = harness(
		"http://localhost/app/",
		RouterConfig::new().with_base("/app/"),
	);
	let (calls, action) = recorder();
	h.runtime.route().register("/users/:id", action);

	assert!(h.runtime.navigate("/users/9/"));

	assert_eq!(
		h.host.current_url().as_deref(),
		Some("http://localhost/app/users/9")
	);
	assert_eq!(*calls.borrow(), vec![named(&[("id", "9")])]);
}

/// Success Criterion 4: switching the base at runtime
#[rstest]
fn test_base_switch(hash: Harness) {
	let (calls, action) = recorder();
	hash.runtime.route().register("/docs/..", action);

	hash.runtime.base(Some("/"));
	assert!(hash.runtime.navigate("docs/intro/setup"));

	assert_eq!(
		hash.host.current_url().as_deref(),
		Some("http://localhost/docs/intro/setup")
	);
	assert_eq!(*calls.borrow(), vec![RouteArgs::Positional(vec![])]);
}

/// Success Criterion 4: title and replace
#[rstest]
fn test_title_and_replace(hash: Harness) {
	hash.runtime.route().register("/*", |_| {});
	hash.host.set_title("Start");

	hash.runtime.navigate_with("/a", Some("Page A"), false);
	assert_eq!(hash.host.title(), "Page A");
	assert_eq!(hash.host.history_len(), 2);

	hash.runtime.navigate_with("/b", None, true);
	assert_eq!(hash.host.title(), "Page A");
	assert_eq!(hash.host.history_len(), 2);
	assert_eq!(
		hash.host.current_url().as_deref(),
		Some("http://localhost/#b")
	);
}

/// Success Criterion 4: host failures surface from try_navigate
#[rstest]
fn test_try_navigate_reports_history_failure() {
	let h = harness(
		"http://localhost/",
		RouterConfig::new().with_base("https://elsewhere.example/"),
	);

	let result = h.runtime.try_navigate("x", None, false);

	assert!(matches!(result, Err(RouteError::HistoryFailed(_))));
	assert!(!h.runtime.navigate("x"));
	assert_eq!(h.host.history_len(), 1);
}

/// Success Criterion 4: parsers can be swapped for the whole runtime
#[rstest]
fn test_custom_secondary_parser(hash: Harness) {
	let (calls, action) = recorder();
	let sub = hash.runtime.create();
	sub.register("/upper", action);
	hash.runtime.parser(
		None,
		Some(Rc::new(|path: &str, filter: &str| {
			path.eq_ignore_ascii_case(filter)
				.then(|| RouteArgs::Positional(vec![path.to_string()]))
		})),
	);

	assert!(hash.runtime.navigate("/UPPER"));
	assert_eq!(*calls.borrow(), vec![RouteArgs::Positional(vec!["UPPER".into()])]);

	hash.runtime.parser(None, None);
	assert!(!sub.dispatch("UPPER"));
	assert!(sub.dispatch("upper"));
}

/// Success Criterion 5: without a history API the path is dispatched directly
#[rstest]
fn test_static_host_dispatches_synchronously() {
	let runtime = RouterRuntime::with_host(StaticHost::new()).unwrap();
	let (calls, action) = recorder();
	runtime.route().register("/profile/:user", action);

	assert!(runtime.navigate("#/profile/bob"));
	assert!(runtime.navigate("/profile/bob"));
	assert!(!runtime.navigate("/nope"));

	assert_eq!(calls.borrow().len(), 2);
}

/// Success Criterion 5: a redirect loop without a history API stops at the depth cap
#[rstest]
fn test_static_host_redirect_loop_terminates() {
	let runtime = RouterRuntime::with_host(StaticHost::new()).unwrap();
	let a_calls = Rc::new(Cell::new(0));
	let b_calls = Rc::new(Cell::new(0));

	let redirect = runtime.clone();
	let counter = a_calls.clone();
	runtime.route().register("/a", move |_| {
		counter.set(counter.get() + 1);
		redirect.navigate("/b");
	});
	let redirect = runtime.clone();
	let counter = b_calls.clone();
	runtime.route().register("/b", move |_| {
		counter.set(counter.get() + 1);
		redirect.navigate("/a");
	});

	assert!(runtime.navigate("/a"));

	assert_eq!(a_calls.get(), 2);
	assert_eq!(b_calls.get(), 1);

	// The next burst starts from a fresh depth.
	assert!(runtime.navigate("/b"));
	assert_eq!(b_calls.get(), 3);
}

/// Success Criterion 5: the query of the current URL
#[rstest]
fn test_query_after_navigation(hash: Harness) {
	hash.runtime.route().register("/search..", |_| {});
	hash.runtime.navigate("/search?q=rust&page=2");

	let query = hash.runtime.query();
	assert_eq!(query.get("q").map(String::as_str), Some("rust"));
	assert_eq!(query.get("page").map(String::as_str), Some("2"));
}
