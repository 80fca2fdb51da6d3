//! Filter parsers.
//!
//! A router asks a parser whether a canonical path satisfies one of its
//! filters. Two parsers are active per runtime:
//!
//! - the **primary** parser handles the default route ([`DEFAULT_ROUTE`]) and
//!   splits the path into segments;
//! - the **secondary** parser handles every other filter.
//!
//! Both return `None` for "no match". Either can be replaced through
//! [`RouterRuntime::parser`](crate::RouterRuntime::parser).
//!
//! # Filter syntax of the default secondary parser
//!
//! | Filter | Meaning |
//! |--------|---------|
//! | `/users/:id` | optional named segment, yields `Named` |
//! | `/files/*` | one segment (no `/`, `?`, `#`), yields `Positional` |
//! | `/docs/..` | anything, not captured |
//! | `?` | literal question mark |
//!
//! Any other character is used as a regular expression, so `/v1.0` also
//! matches `/v1x0`. A filter that does not compile never matches.

use regex::{Captures, Regex, RegexBuilder};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

/// Filter sentinel for the default (unmatched) route.
pub const DEFAULT_ROUTE: &str = "@";

/// Maximum allowed length for a filter pattern in bytes.
const MAX_FILTER_LENGTH: usize = 1024;

/// Maximum allowed size for a compiled filter regex (in bytes).
const MAX_FILTER_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Compiled filters kept per thread before the cache is flushed.
const MAX_CACHED_FILTERS: usize = 256;

static PLACEHOLDER_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"/:(\w+)").expect("PLACEHOLDER_RE: invalid regex pattern"));

// Value of a `/:name` segment, including its leading slash.
const PLACEHOLDER_VALUE: &str = r"/[a-zA-Z0-9_\-+=:()\[\]\s]+";

/// Arguments extracted from a matched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteArgs {
	/// Capture groups (or path segments for the default route), in order.
	/// Empty captures are kept.
	Positional(Vec<String>),
	/// Placeholder name → value. Placeholders that captured nothing are
	/// absent.
	Named(HashMap<String, String>),
}

impl RouteArgs {
	/// Returns the positional values, if any.
	pub fn positional(&self) -> Option<&[String]> {
		match self {
			Self::Positional(values) => Some(values),
			Self::Named(_) => None,
		}
	}

	/// Returns the named values, if any.
	pub fn named(&self) -> Option<&HashMap<String, String>> {
		match self {
			Self::Named(values) => Some(values),
			Self::Positional(_) => None,
		}
	}

	/// Looks up a named value.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.named()?.get(name).map(String::as_str)
	}

	/// Returns the positional value at `index`.
	pub fn at(&self, index: usize) -> Option<&str> {
		self.positional()?.get(index).map(String::as_str)
	}

	/// Number of extracted values.
	pub fn len(&self) -> usize {
		match self {
			Self::Positional(values) => values.len(),
			Self::Named(values) => values.len(),
		}
	}

	/// Whether nothing was extracted.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for RouteArgs {
	fn default() -> Self {
		Self::Positional(Vec::new())
	}
}

/// Parser used for the default route: `(path) -> args`.
pub type PrimaryParser = Rc<dyn Fn(&str) -> Option<RouteArgs>>;

/// Parser used for every other filter: `(path, filter) -> args`.
pub type SecondaryParser = Rc<dyn Fn(&str, &str) -> Option<RouteArgs>>;

/// The pair of parsers active in a runtime.
#[derive(Clone)]
pub struct Parsers {
	/// Default-route parser.
	pub primary: PrimaryParser,
	/// Filter parser.
	pub secondary: SecondaryParser,
}

impl Default for Parsers {
	fn default() -> Self {
		Self {
			primary: Rc::new(default_parser),
			secondary: Rc::new(default_second_parser),
		}
	}
}

impl fmt::Debug for Parsers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Parsers").finish_non_exhaustive()
	}
}

/// Splits `path` on `/`, `?` and `#`.
///
/// ```
/// use reinhardt_route_core::parser::{default_parser, RouteArgs};
///
/// let args = default_parser("users/42?tab=posts").unwrap();
/// assert_eq!(args.positional().unwrap(), ["users", "42", "tab=posts"]);
/// ```
pub fn default_parser(path: &str) -> Option<RouteArgs> {
	Some(RouteArgs::Positional(
		path.split(['/', '?', '#']).map(str::to_string).collect(),
	))
}

/// Matches `path` against `filter` (both already normalized).
///
/// ```
/// use reinhardt_route_core::parser::default_second_parser;
///
/// let args = default_second_parser("users/42", "users/:id/:tab").unwrap();
/// assert_eq!(args.get("id"), Some("42"));
/// assert_eq!(args.get("tab"), None);
///
/// assert!(default_second_parser("a/b/c", "a/*").is_none());
/// ```
pub fn default_second_parser(path: &str, filter: &str) -> Option<RouteArgs> {
	compiled(filter)?.matches(path)
}

/// A filter translated into an anchored regular expression.
#[derive(Debug)]
struct CompiledFilter {
	regex: Regex,
	/// Placeholder names; the i-th one is captured by group `p{i}`.
	placeholders: Vec<String>,
}

impl CompiledFilter {
	fn compile(filter: &str) -> Option<Self> {
		if filter.len() > MAX_FILTER_LENGTH {
			return None;
		}

		let translated = filter
			.replace('?', r"\?")
			.replace('*', "([^/?#]+?)")
			.replacen("..", ".*", 1);

		let mut placeholders = Vec::new();
		let source = PLACEHOLDER_RE.replace_all(&translated, |caps: &Captures<'_>| {
			let index = placeholders.len();
			placeholders.push(caps[1].to_string());
			format!("(?P<p{index}>{PLACEHOLDER_VALUE}|)")
		});

		let regex = RegexBuilder::new(&format!("^{source}$"))
			.size_limit(MAX_FILTER_REGEX_SIZE)
			.build()
			.ok()?;

		Some(Self {
			regex,
			placeholders,
		})
	}

	fn matches(&self, path: &str) -> Option<RouteArgs> {
		let caps = self.regex.captures(path)?;

		if self.placeholders.is_empty() {
			let values = caps
				.iter()
				.skip(1)
				.map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
				.collect();
			return Some(RouteArgs::Positional(values));
		}

		let mut named = HashMap::new();
		for (index, name) in self.placeholders.iter().enumerate() {
			let captured = caps.name(&format!("p{index}")).map_or("", |m| m.as_str());
			if let Some(value) = captured.strip_prefix('/') {
				named.insert(name.clone(), value.to_string());
			}
		}
		Some(RouteArgs::Named(named))
	}
}

thread_local! {
	static FILTER_CACHE: RefCell<HashMap<String, Option<Rc<CompiledFilter>>>> =
		RefCell::new(HashMap::new());
}

fn compiled(filter: &str) -> Option<Rc<CompiledFilter>> {
	FILTER_CACHE.with(|cache| {
		if let Some(hit) = cache.borrow().get(filter) {
			return hit.clone();
		}

		let compiled = CompiledFilter::compile(filter).map(Rc::new);
		let mut cache = cache.borrow_mut();
		if cache.len() >= MAX_CACHED_FILTERS {
			cache.clear();
		}
		cache.insert(filter.to_string(), compiled.clone());
		compiled
	})
}
