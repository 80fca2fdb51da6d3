//! # Reinhardt Route
//!
//! Client-side routing for single-page applications, driven by the browser
//! History API or the URL hash.
//!
//! ## Feature Flags
//!
//! - `region` (default) - Declarative routing regions and outlets
//! - `debug-hooks` - Verbose dispatch and emission traces
//!
//! ## Quick Start
//!
//! The free functions route through a per-thread runtime, which uses the
//! browser on `wasm32` and a history-less host elsewhere:
//!
//! ```rust,ignore
//! use reinhardt_route::prelude::*;
//!
//! register("/posts/:slug", |args| {
//!     render_post(args.get("slug").unwrap_or_default());
//! });
//! register_default(|_| render_not_found());
//! reinhardt_route::start(true)?;
//! ```
//!
//! Tests and embedders build an explicit [`RouterRuntime`] over any
//! [`NavigationHost`]:
//!
//! ```
//! use reinhardt_route::RouterRuntime;
//! use reinhardt_route::host::MemoryHost;
//!
//! let runtime = RouterRuntime::with_host(MemoryHost::new("http://localhost/")).unwrap();
//! runtime.route().register("/about", |_| {});
//! assert!(runtime.navigate("/about"));
//! assert!(!runtime.navigate("/missing"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use reinhardt_route_core::{
	Anchor, ClickEvent, ClickEventKind, ClickOutcome, DEFAULT_ROUTE, HostListener, ListenerId,
	NavigationHost, Observable, Parsers, PrimaryParser, RouteAction, RouteArgs, RouteCommand,
	RouteError, Router, RouterConfig, RouterRuntime, SecondaryParser,
};
pub use reinhardt_route_core::{config, error, host, logging, observable, parser, path, query};

pub use reinhardt_route_core::global::{
	base, create, exec, install_runtime, navigate, navigate_with, parser as set_parser, query,
	register, register_default, reset_runtime, route, start, stop, with_runtime,
};

#[cfg(feature = "region")]
#[cfg_attr(docsrs, doc(cfg(feature = "region")))]
pub mod region {
	//! Declarative routing regions.
	pub use reinhardt_route_region::*;
}

#[cfg(feature = "region")]
pub use reinhardt_route_region::{RouteOutlet, RouteProps, RouterRegion, Verdict};

/// Commonly used items.
pub mod prelude {
	pub use reinhardt_route_core::prelude::*;

	#[cfg(feature = "region")]
	pub use reinhardt_route_region::{RouteOutlet, RouteProps, RouterRegion};
}
