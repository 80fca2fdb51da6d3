//! Query-string extraction.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static QUERY_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[?&](.+?)=([^&]*)").expect("QUERY_PAIR_RE: invalid regex pattern")
});

/// Collects `key=value` pairs from `href`.
///
/// Values are returned raw (no percent-decoding). A repeated key keeps its
/// last value.
///
/// ```
/// use reinhardt_route_core::query::parse_query;
///
/// let q = parse_query("https://example.com/search?q=rust&page=2&page=3");
/// assert_eq!(q.get("q").map(String::as_str), Some("rust"));
/// assert_eq!(q.get("page").map(String::as_str), Some("3"));
/// ```
pub fn parse_query(href: &str) -> HashMap<String, String> {
	QUERY_PAIR_RE
		.captures_iter(href)
		.map(|caps| (caps[1].to_string(), caps[2].to_string()))
		.collect()
}
