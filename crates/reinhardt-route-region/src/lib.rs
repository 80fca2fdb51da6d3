//! Declarative routing regions for Reinhardt single-page applications.
//!
//! A [`RouterRegion`] owns a sub-router and a set of [`RouteOutlet`]s, one
//! per path. When the runtime dispatches a path, the matching outlet is
//! shown and every other one hidden; the host re-renders through its
//! [`Renderer`] and calls [`RouteOutlet::updated`] afterwards so nested
//! components receive the matched arguments.
//!
//! An optional [`Interceptor`] can veto or delay activation, e.g. while an
//! authorization check is in flight:
//!
//! ```
//! use reinhardt_route_core::RouterRuntime;
//! use reinhardt_route_core::host::MemoryHost;
//! use reinhardt_route_region::{RouteProps, RouterRegion};
//!
//! let runtime = RouterRuntime::with_host(MemoryHost::new("http://localhost/")).unwrap();
//! let region = RouterRegion::new(&runtime, || {});
//! region.intercept_with(|props, verdict| {
//!     verdict.resolve(props.option("role") != Some("admin"));
//! });
//! let admin = region.outlet(RouteProps::new("/admin").with_option("role", "admin"));
//! let public = region.outlet(RouteProps::new("/public"));
//!
//! runtime.navigate("/admin");
//! assert!(!admin.is_shown());
//! runtime.navigate("/public");
//! assert!(public.is_shown());
//! ```

pub mod interceptor;
pub mod outlet;
pub mod region;

pub use interceptor::{Interceptor, Verdict};
pub use outlet::{Renderer, RouteOutlet, RouteProps, RouteTarget};
pub use region::{CHANGE_EVENT, RouterRegion};
