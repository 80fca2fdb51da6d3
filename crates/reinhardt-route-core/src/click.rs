//! Link-click interception policy.
//!
//! A click is turned into history navigation only when it is a plain
//! primary click on a same-origin anchor that stays inside the base, is not
//! a same-document fragment jump, and resolves to a route. Everything else
//! is left to the browser.

use crate::debug_log;
use crate::host::{ClickEvent, ClickOutcome};
use crate::path::{before_base, is_hash_base, origin_of, path_from_base, path_from_root, without_fragment};
use crate::runtime::RuntimeShared;

pub(crate) fn intercept(runtime: &RuntimeShared, event: &ClickEvent) -> ClickOutcome {
	if event.button != 0
		|| event.meta_key
		|| event.ctrl_key
		|| event.shift_key
		|| event.default_prevented
	{
		return ClickOutcome::Native;
	}

	let Some(anchor) = &event.anchor else {
		return ClickOutcome::Native;
	};
	let Some(href) = anchor.href.as_deref() else {
		return ClickOutcome::Native;
	};
	if anchor.download || anchor.target.as_deref().is_some_and(|target| target != "_self") {
		return ClickOutcome::Native;
	}

	let Some(location) = runtime.host().current_url() else {
		return ClickOutcome::Native;
	};
	match origin_of(&location) {
		Some(origin) if href.starts_with(origin) => {}
		_ => return ClickOutcome::Native,
	}

	if href != location {
		let base = runtime.base();
		let fragment_jump = without_fragment(href) == without_fragment(&location);
		let outside_base = if is_hash_base(&base) {
			before_base(href, &base) != before_base(&location, &base)
		} else {
			!path_from_root(href).starts_with(base.as_str())
		};
		if fragment_jump || outside_base {
			return ClickOutcome::Native;
		}

		let title = anchor.title.as_deref().filter(|title| !title.is_empty());
		if !runtime.navigate(path_from_base(href, &base), title, false) {
			debug_log!("No route for {:?}; following link natively", href);
			return ClickOutcome::Native;
		}
	}

	ClickOutcome::Intercepted
}
