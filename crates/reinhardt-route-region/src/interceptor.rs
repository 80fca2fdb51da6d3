//! Route activation guards.

use crate::outlet::RouteProps;
use std::fmt;
use std::rc::Rc;

/// Guard consulted before an outlet is activated.
///
/// It receives the outlet's props and a [`Verdict`] it may settle at any
/// time, including after an asynchronous check.
pub type Interceptor = Rc<dyn Fn(&RouteProps, Verdict)>;

/// One-shot answer to an [`Interceptor`].
///
/// Only [`Verdict::allow`] activates the outlet. Denying, or dropping the
/// verdict unsettled, leaves the region as it is.
#[must_use = "the outlet is only activated by calling `allow`"]
pub struct Verdict {
	complete: Box<dyn FnOnce()>,
}

impl Verdict {
	pub(crate) fn new(complete: impl FnOnce() + 'static) -> Self {
		Self {
			complete: Box::new(complete),
		}
	}

	/// Activates the outlet.
	pub fn allow(self) {
		(self.complete)();
	}

	/// Rejects the activation.
	pub fn deny(self) {}

	/// Allows when `allowed` is true, denies otherwise.
	pub fn resolve(self, allowed: bool) {
		if allowed {
			self.allow();
		}
	}
}

impl fmt::Debug for Verdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Verdict").finish_non_exhaustive()
	}
}
