//! Route outlets: the per-path slots of a region.

use reinhardt_route_core::RouteArgs;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Host re-render hook, called whenever outlet visibility changes.
pub trait Renderer {
	/// Re-renders the region.
	fn update(&self);
}

impl<F: Fn()> Renderer for F {
	fn update(&self) {
		self()
	}
}

/// A component nested in an outlet that wants the matched arguments.
pub trait RouteTarget {
	/// Receives the arguments of the route that activated the outlet.
	fn on_route(&self, args: &RouteArgs);
}

impl<F: Fn(&RouteArgs)> RouteTarget for F {
	fn on_route(&self, args: &RouteArgs) {
		self(args)
	}
}

/// Declared attributes of an outlet: its filter plus free-form options
/// forwarded to the interceptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteProps {
	/// Filter the outlet is registered under.
	pub path: String,
	/// Extra attributes.
	pub options: HashMap<String, String>,
}

impl RouteProps {
	/// Props for `path` without options.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			options: HashMap::new(),
		}
	}

	/// Adds an option.
	pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.insert(key.into(), value.into());
		self
	}

	/// Looks up an option.
	pub fn option(&self, key: &str) -> Option<&str> {
		self.options.get(key).map(String::as_str)
	}
}

struct OutletState {
	props: RouteProps,
	show: Cell<bool>,
	pending: RefCell<Option<RouteArgs>>,
	children: RefCell<Vec<Rc<dyn RouteTarget>>>,
}

/// One slot of a [`RouterRegion`](crate::RouterRegion), shown while its path
/// is the active one. Clones share state.
#[derive(Clone)]
pub struct RouteOutlet {
	state: Rc<OutletState>,
}

impl RouteOutlet {
	pub(crate) fn new(props: RouteProps) -> Self {
		Self {
			state: Rc::new(OutletState {
				props,
				show: Cell::new(false),
				pending: RefCell::new(None),
				children: RefCell::new(Vec::new()),
			}),
		}
	}

	/// The outlet's declared props.
	pub fn props(&self) -> &RouteProps {
		&self.state.props
	}

	/// Whether the outlet is currently shown.
	pub fn is_shown(&self) -> bool {
		self.state.show.get()
	}

	pub(crate) fn set_shown(&self, show: bool) {
		self.state.show.set(show);
	}

	pub(crate) fn set_pending(&self, args: RouteArgs) {
		*self.state.pending.borrow_mut() = Some(args);
	}

	/// Arguments waiting for delivery to children.
	pub fn pending_args(&self) -> Option<RouteArgs> {
		self.state.pending.borrow().clone()
	}

	/// Attaches a rendered child component.
	pub fn add_child(&self, child: impl RouteTarget + 'static) {
		self.state.children.borrow_mut().push(Rc::new(child));
	}

	/// Detaches every child, e.g. when the outlet's content unmounts.
	pub fn clear_children(&self) {
		self.state.children.borrow_mut().clear();
	}

	/// Number of attached children.
	pub fn child_count(&self) -> usize {
		self.state.children.borrow().len()
	}

	/// Called by the host after the outlet rendered.
	///
	/// Once the outlet has children, the pending arguments are delivered to
	/// each of them exactly once. Without children they stay pending.
	pub fn updated(&self) {
		let children: Vec<Rc<dyn RouteTarget>> = self.state.children.borrow().clone();
		if children.is_empty() {
			return;
		}
		let Some(args) = self.state.pending.borrow_mut().take() else {
			return;
		};
		for child in children {
			child.on_route(&args);
		}
	}

	/// Whether both handles refer to the same outlet.
	pub fn ptr_eq(&self, other: &RouteOutlet) -> bool {
		Rc::ptr_eq(&self.state, &other.state)
	}
}

impl fmt::Debug for RouteOutlet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteOutlet")
			.field("path", &self.state.props.path)
			.field("show", &self.state.show.get())
			.field("children", &self.child_count())
			.finish()
	}
}
