//! URL → canonical path reduction.
//!
//! Every comparison and match in the router works on the *canonical path*:
//! the URL with its origin and base removed and one leading and one trailing
//! slash stripped.

use regex::Regex;
use std::sync::LazyLock;

// Scheme and host, e.g. `https://example.com:8080`.
static ORIGIN_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^.+?//+[^/]+").expect("ORIGIN_RE: invalid regex pattern"));

/// Strips exactly one leading and one trailing `/`.
///
/// ```
/// use reinhardt_route_core::path::normalize;
///
/// assert_eq!(normalize("/a/b/"), "a/b");
/// assert_eq!(normalize("a/b"), "a/b");
/// assert_eq!(normalize("//a//"), "/a/");
/// ```
pub fn normalize(path: &str) -> &str {
	let path = path.strip_prefix('/').unwrap_or(path);
	path.strip_suffix('/').unwrap_or(path)
}

/// Returns the scheme and host part of `href`, if any.
pub fn origin_of(href: &str) -> Option<&str> {
	ORIGIN_RE.find(href).map(|m| m.as_str())
}

/// Returns the part of `href` after the scheme and host.
pub fn path_from_root(href: &str) -> &str {
	match ORIGIN_RE.find(href) {
		Some(m) => &href[m.end()..],
		None => href,
	}
}

/// Reduces `href` to its base-relative path.
///
/// With a hash base (`#`, `#!`) the result is everything after the first
/// occurrence of the base, or `""` if the base does not occur. With a path
/// base the origin is dropped and the base removed when it is a prefix.
pub fn path_from_base<'a>(href: &'a str, base: &str) -> &'a str {
	if is_hash_base(base) {
		match href.find(base) {
			Some(index) => &href[index + base.len()..],
			None => "",
		}
	} else {
		let path = path_from_root(href);
		path.strip_prefix(base).unwrap_or(path)
	}
}

/// Whether `base` routes on the URL fragment.
pub fn is_hash_base(base: &str) -> bool {
	base.starts_with('#')
}

/// Returns `href` without its fragment.
pub(crate) fn without_fragment(href: &str) -> &str {
	href.split_once('#').map_or(href, |(head, _)| head)
}

/// Returns the part of `href` before the first occurrence of `base`.
pub(crate) fn before_base<'a>(href: &'a str, base: &str) -> &'a str {
	href.split_once(base).map_or(href, |(head, _)| head)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/a/b/", "a/b")]
	#[case("a/b", "a/b")]
	#[case("/a/b", "a/b")]
	#[case("a/b/", "a/b")]
	#[case("/", "")]
	#[case("", "")]
	#[case("//", "")]
	fn test_normalize(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize(input), expected);
	}

	#[rstest]
	#[case("https://example.com/users/42", Some("https://example.com"))]
	#[case("http://localhost:8080/#home", Some("http://localhost:8080"))]
	#[case("/users/42", None)]
	fn test_origin_of(#[case] href: &str, #[case] expected: Option<&str>) {
		assert_eq!(origin_of(href), expected);
	}

	#[rstest]
	#[case("https://example.com/users/42?tab=1", "/users/42?tab=1")]
	#[case("https://example.com", "")]
	#[case("/already/relative", "/already/relative")]
	fn test_path_from_root(#[case] href: &str, #[case] expected: &str) {
		assert_eq!(path_from_root(href), expected);
	}

	#[rstest]
	#[case("http://localhost/#profile/alice", "#", "profile/alice")]
	#[case("http://localhost/#!/profile/alice", "#!", "/profile/alice")]
	#[case("http://localhost/#a#b", "#", "a#b")]
	#[case("http://localhost/", "#", "")]
	#[case("http://localhost/app/users/42", "/app/", "users/42")]
	#[case("http://localhost/users/42", "/app/", "/users/42")]
	#[case("http://localhost/users/42", "/", "users/42")]
	fn test_path_from_base(#[case] href: &str, #[case] base: &str, #[case] expected: &str) {
		assert_eq!(path_from_base(href, base), expected);
	}

	#[rstest]
	fn test_fragment_helpers() {
		assert_eq!(without_fragment("http://h/x#y"), "http://h/x");
		assert_eq!(without_fragment("http://h/x"), "http://h/x");
		assert_eq!(before_base("http://h/#!a", "#!"), "http://h/");
	}
}
