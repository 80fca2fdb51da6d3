//! Routing regions.

use crate::interceptor::{Interceptor, Verdict};
use crate::outlet::{Renderer, RouteOutlet, RouteProps};
use reinhardt_route_core::host::TimerId;
use reinhardt_route_core::{ListenerId, Observable, RouteArgs, Router, RouterRuntime, error_log};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Event emitted after an outlet has been selected.
pub const CHANGE_EVENT: &str = "change";

struct RegionState {
	runtime: RouterRuntime,
	router: Router,
	renderer: Rc<dyn Renderer>,
	outlets: RefCell<Vec<RouteOutlet>>,
	interceptor: RefCell<Option<Interceptor>>,
	events: Observable<RouteOutlet>,
	mount_timer: Cell<Option<TimerId>>,
}

impl RegionState {
	fn activate(self: &Rc<Self>, outlet: RouteOutlet, args: RouteArgs) {
		let interceptor = self.interceptor.borrow().clone();
		match interceptor {
			Some(interceptor) => {
				let region: Weak<RegionState> = Rc::downgrade(self);
				let props = outlet.props().clone();
				interceptor(
					&props,
					Verdict::new(move || {
						if let Some(region) = region.upgrade() {
							region.complete(&outlet, args);
						}
					}),
				);
			}
			None => self.complete(&outlet, args),
		}
	}

	fn complete(&self, outlet: &RouteOutlet, args: RouteArgs) {
		outlet.set_pending(args);
		self.select(outlet);
	}

	fn select(&self, target: &RouteOutlet) {
		if !target.is_shown() {
			let outlets = self.outlets.borrow().clone();
			for outlet in &outlets {
				outlet.set_shown(false);
			}
			self.renderer.update();
			target.set_shown(true);
		}
		self.renderer.update();
		self.events.trigger(CHANGE_EVENT, target);
	}
}

/// A mount point showing one of its outlets at a time, driven by its own
/// sub-router.
///
/// ```
/// use reinhardt_route_core::RouterRuntime;
/// use reinhardt_route_core::host::MemoryHost;
/// use reinhardt_route_region::{RouteProps, RouterRegion};
///
/// let runtime = RouterRuntime::with_host(MemoryHost::new("http://localhost/")).unwrap();
/// let region = RouterRegion::new(&runtime, || {});
/// let home = region.outlet(RouteProps::new("/"));
/// let user = region.outlet(RouteProps::new("/users/:id"));
///
/// runtime.navigate("/users/7");
/// assert!(user.is_shown());
/// assert!(!home.is_shown());
/// ```
#[derive(Clone)]
pub struct RouterRegion {
	state: Rc<RegionState>,
}

impl RouterRegion {
	/// Creates a region with a fresh sub-router of `runtime`.
	pub fn new(runtime: &RouterRuntime, renderer: impl Renderer + 'static) -> Self {
		Self {
			state: Rc::new(RegionState {
				runtime: runtime.clone(),
				router: runtime.create(),
				renderer: Rc::new(renderer),
				outlets: RefCell::new(Vec::new()),
				interceptor: RefCell::new(None),
				events: Observable::new(),
				mount_timer: Cell::new(None),
			}),
		}
	}

	/// Declares an outlet and routes its path to it.
	pub fn outlet(&self, props: RouteProps) -> RouteOutlet {
		let outlet = RouteOutlet::new(props);
		self.state.outlets.borrow_mut().push(outlet.clone());

		let region: Weak<RegionState> = Rc::downgrade(&self.state);
		let target = outlet.clone();
		self.state
			.router
			.register(&outlet.props().path, move |args: &RouteArgs| {
				if let Some(region) = region.upgrade() {
					region.activate(target.clone(), args.clone());
				}
			});
		outlet
	}

	/// Shows `target`, hiding every other outlet, then emits
	/// [`CHANGE_EVENT`]. Selecting the shown outlet only re-renders.
	pub fn select(&self, target: &RouteOutlet) {
		self.state.select(target);
	}

	/// Calls `listener` after every selection.
	pub fn on_change<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&RouteOutlet) + 'static,
	{
		self.state
			.events
			.on(CHANGE_EVENT, move |_, outlet: &RouteOutlet| listener(outlet))
	}

	/// Removes a change listener.
	pub fn off_change(&self, id: ListenerId) {
		self.state.events.off_listener(CHANGE_EVENT, id);
	}

	/// Installs or removes the activation guard.
	pub fn set_interceptor(&self, interceptor: Option<Interceptor>) {
		*self.state.interceptor.borrow_mut() = interceptor;
	}

	/// Installs a closure as the activation guard.
	pub fn intercept_with<F>(&self, interceptor: F)
	where
		F: Fn(&RouteProps, Verdict) + 'static,
	{
		self.set_interceptor(Some(Rc::new(interceptor)));
	}

	/// Schedules `start(true)` on the runtime for the next host tick.
	pub fn mount(&self) {
		let runtime = self.state.runtime.clone();
		let region: Weak<RegionState> = Rc::downgrade(&self.state);
		let timer = self.state.runtime.host().set_timeout(
			Duration::ZERO,
			Box::new(move || {
				if let Some(region) = region.upgrade() {
					region.mount_timer.set(None);
				}
				if let Err(e) = runtime.start(true) {
					error_log!("Failed to start router on mount: {}", e);
				}
			}),
		);
		self.state.mount_timer.set(Some(timer));
	}

	/// Stops the region's sub-router. The runtime and sibling regions keep
	/// running.
	pub fn unmount(&self) {
		self.state.router.stop();
	}

	/// Whether a mount is scheduled but has not run yet.
	pub fn is_mount_pending(&self) -> bool {
		self.state.mount_timer.get().is_some()
	}

	/// Declared outlets, in declaration order.
	pub fn outlets(&self) -> Vec<RouteOutlet> {
		self.state.outlets.borrow().clone()
	}

	/// The outlet currently shown, if any.
	pub fn selected(&self) -> Option<RouteOutlet> {
		self.state
			.outlets
			.borrow()
			.iter()
			.find(|outlet| outlet.is_shown())
			.cloned()
	}

	/// The region's sub-router.
	pub fn router(&self) -> Router {
		self.state.router.clone()
	}

	/// The runtime the region routes on.
	pub fn runtime(&self) -> &RouterRuntime {
		&self.state.runtime
	}
}

impl fmt::Debug for RouterRegion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterRegion")
			.field("outlets", &self.state.outlets.borrow())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_route_core::host::StaticHost;
	use rstest::rstest;

	fn region() -> (Rc<Cell<u32>>, RouterRegion) {
		let renders = Rc::new(Cell::new(0));
		let counter = renders.clone();
		let runtime = RouterRuntime::with_host(StaticHost::new()).unwrap();
		let region = RouterRegion::new(&runtime, move || counter.set(counter.get() + 1));
		(renders, region)
	}

	#[rstest]
	fn test_select_hidden_outlet_renders_twice() {
		let (renders, region) = region();
		let outlet = region.outlet(RouteProps::new("/a"));

		region.select(&outlet);

		assert!(outlet.is_shown());
		assert_eq!(renders.get(), 2);
	}

	#[rstest]
	fn test_select_shown_outlet_renders_once() {
		let (renders, region) = region();
		let outlet = region.outlet(RouteProps::new("/a"));
		region.select(&outlet);

		region.select(&outlet);

		assert_eq!(renders.get(), 3);
	}

	#[rstest]
	fn test_select_hides_siblings() {
		let (_renders, region) = region();
		let a = region.outlet(RouteProps::new("/a"));
		let b = region.outlet(RouteProps::new("/b"));
		region.select(&a);

		region.select(&b);

		assert!(!a.is_shown());
		assert!(b.is_shown());
		assert!(region.selected().is_some_and(|s| s.ptr_eq(&b)));
	}

	#[rstest]
	fn test_outlet_registers_filter() {
		let (_renders, region) = region();
		region.outlet(RouteProps::new("users/:id/"));
		assert_eq!(region.router().filters(), vec!["/users/:id"]);
	}
}
