//! History and hash routing core for Reinhardt single-page applications.
//!
//! The core turns URL changes into route callbacks:
//!
//! 1. a [`NavigationHost`](host::NavigationHost) reports `popstate`,
//!    `hashchange` and link clicks;
//! 2. the runtime reduces the current URL to a canonical path (base, origin
//!    and one leading/trailing slash removed) and broadcasts it once per
//!    distinct path;
//! 3. every live [`Router`] matches the path against its filters in order
//!    and runs the actions of the first match.
//!
//! ## Filters
//!
//! - `/users/:id` captures a named, optional segment
//! - `/files/*` captures one positional segment
//! - `/docs/..` matches anything below `/docs`
//! - `@` is the default route, run when nothing else matches
//!
//! ## Example
//!
//! ```
//! use reinhardt_route_core::RouterRuntime;
//! use reinhardt_route_core::host::MemoryHost;
//!
//! let host = MemoryHost::new("http://localhost/");
//! let runtime = RouterRuntime::with_host(host.clone()).unwrap();
//!
//! let users = runtime.create();
//! users.register("/users/:id", |args| {
//!     assert_eq!(args.get("id"), Some("42"));
//! });
//!
//! assert!(runtime.navigate("/users/42"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

mod click;
pub mod config;
mod emitter;
pub mod error;
pub mod global;
pub mod host;
pub mod observable;
pub mod parser;
pub mod path;
pub mod query;
pub mod router;
pub mod runtime;

pub use config::{ClickEventKind, RouterConfig};
pub use error::RouteError;
pub use host::{Anchor, ClickEvent, ClickOutcome, HostListener, NavigationHost};
pub use observable::{ListenerId, Observable};
pub use parser::{DEFAULT_ROUTE, Parsers, PrimaryParser, RouteArgs, SecondaryParser};
pub use router::{RouteAction, RouteCommand, Router};
pub use runtime::RouterRuntime;

/// Commonly used items.
pub mod prelude {
	pub use crate::global::{navigate, register, register_default, with_runtime};
	pub use crate::{
		NavigationHost, RouteArgs, RouteCommand, RouteError, Router, RouterConfig, RouterRuntime,
	};
}
