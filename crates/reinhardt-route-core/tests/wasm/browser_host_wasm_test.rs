//! Browser host tests
//!
//! Run with `wasm-pack test --headless --chrome crates/reinhardt-route-core`.

#![cfg(target_arch = "wasm32")]

use reinhardt_route_core::host::{BrowserHost, NavigationHost};
use reinhardt_route_core::{RouterConfig, RouterRuntime};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn runtime() -> (Rc<BrowserHost>, RouterRuntime) {
	let host = Rc::new(BrowserHost::new().unwrap());
	let runtime = RouterRuntime::new(host.clone(), RouterConfig::default()).unwrap();
	(host, runtime)
}

#[wasm_bindgen_test]
fn test_browser_host_reports_location() {
	let host = BrowserHost::new().unwrap();
	assert!(host.current_url().is_some());
	assert!(host.history_available());
	assert!(host.is_ready());
}

#[wasm_bindgen_test]
fn test_navigate_pushes_hash_entry() {
	let (host, runtime) = runtime();
	let hits = Rc::new(Cell::new(0));
	let counter = hits.clone();
	runtime.route().register("/wasm/:id", move |args| {
		assert_eq!(args.get("id"), Some("1"));
		counter.set(counter.get() + 1);
	});

	assert!(runtime.navigate_with("/wasm/1", Some("Wasm"), false));

	assert_eq!(hits.get(), 1);
	assert!(host.current_url().unwrap().ends_with("#wasm/1"));
	assert_eq!(host.title(), "Wasm");
}

#[wasm_bindgen_test]
fn test_start_and_stop_attach_listeners() {
	let (_host, runtime) = runtime();
	runtime.start(false).unwrap();
	assert!(runtime.is_started());
	runtime.stop();
	assert!(!runtime.is_started());
}

#[wasm_bindgen_test]
fn test_title_round_trip() {
	let host = BrowserHost::new().unwrap();
	host.set_title("reinhardt-route");
	assert_eq!(host.title(), "reinhardt-route");
}

#[wasm_bindgen_test]
fn test_cleared_timers_are_released() {
	let host = BrowserHost::new().unwrap();
	let first = host.set_timeout(Duration::from_millis(50), Box::new(|| {}));
	let second = host.set_timeout(Duration::from_millis(50), Box::new(|| {}));
	assert_ne!(first, second);
	assert_eq!(host.pending_timers(), 2);

	host.clear_timeout(first);
	host.clear_timeout(second);

	assert_eq!(host.pending_timers(), 0);
}

#[wasm_bindgen_test]
fn test_debounced_history_events_keep_one_timer() {
	let (host, runtime) = runtime();
	runtime.start(false).unwrap();
	let window = web_sys::window().unwrap();
	for _ in 0..3 {
		let event = web_sys::Event::new("popstate").unwrap();
		window.dispatch_event(&event).unwrap();
	}

	assert_eq!(host.pending_timers(), 1);
	runtime.stop();
	assert_eq!(host.pending_timers(), 0);
}
