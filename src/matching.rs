//! Path canonicalization and `:param` pattern handling.
//!
//! Every path stored in a [`Route`](crate::Route) goes through
//! [`normalize_path`]: segments are split on `/`, empty segments dropped and
//! the rest joined again without a leading or trailing slash. The root path
//! is the one exception and is stored as `"/"`, so that it stays non-empty
//! and takes part in path equality like every other route.
//!
//! ```text
//! "/product/"      → "product"
//! "//users//42"    → "users/42"
//! "/" | "" | "//"  → "/"
//! ```
//!
//! Template urls may contain `:param` segments. [`match_pattern`] extracts
//! them from a concrete path, [`fill_pattern`] substitutes them back in.

use crate::error::{NavigationError, NavigationResult};
use crate::params::{QueryParams, RouteParams};
use std::borrow::Cow;

/// Canonical form of the root path.
pub const ROOT_PATH: &str = "/";

/// Split a path into its non-empty segments.
///
/// ```
/// use gpui_route_stack::matching::split_path;
///
/// assert_eq!(split_path("/users/123/"), vec!["users", "123"]);
/// assert!(split_path("/").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonicalize a path: no leading or trailing slash, no empty segments.
///
/// Returns [`ROOT_PATH`] for the root. Borrows when the input is already
/// canonical.
///
/// ```
/// use gpui_route_stack::matching::normalize_path;
///
/// assert_eq!(normalize_path("/product/"), "product");
/// assert_eq!(normalize_path("a//b"), "a/b");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let segments = split_path(path);
    if segments.is_empty() {
        return Cow::Borrowed(ROOT_PATH);
    }
    let joined_len = segments.iter().map(|s| s.len()).sum::<usize>() + segments.len() - 1;
    if joined_len == path.len() {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(segments.join("/"))
    }
}

/// Split a location (`/path?query#fragment`) into a canonical path and its
/// query parameters. The fragment is discarded.
///
/// ```
/// use gpui_route_stack::matching::split_location;
///
/// let (path, query) = split_location("/product/?id=2#reviews");
/// assert_eq!(path, "product");
/// assert_eq!(query.get("id"), Some("2"));
/// ```
pub fn split_location(location: &str) -> (String, QueryParams) {
    let without_fragment = location.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((path, query)) => (
            normalize_path(path).into_owned(),
            QueryParams::from_query_string(query),
        ),
        None => (
            normalize_path(without_fragment).into_owned(),
            QueryParams::new(),
        ),
    }
}

/// Extract the parameter name from a `:param` segment.
pub fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix(':').filter(|name| !name.is_empty())
}

/// Return `true` if the url contains at least one `:param` segment.
pub fn is_pattern(url: &str) -> bool {
    split_path(url).iter().any(|s| param_name(s).is_some())
}

/// Match a concrete path against a pattern segment by segment.
///
/// Returns the extracted parameters, or `None` if a literal segment differs
/// or the segment counts differ.
///
/// ```
/// use gpui_route_stack::matching::match_pattern;
///
/// let params = match_pattern("/users/:userId/posts/:postId", "users/1/posts/2").unwrap();
/// assert_eq!(params.get("userId"), Some("1"));
/// assert_eq!(params.get("postId"), Some("2"));
/// assert!(match_pattern("/users/:id", "teams/1").is_none());
/// ```
pub fn match_pattern(pattern: &str, path: &str) -> Option<RouteParams> {
    let pattern_segments = split_path(pattern);
    let path_segments = split_path(path);
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (pattern_seg, path_seg) in pattern_segments.iter().zip(&path_segments) {
        match param_name(pattern_seg) {
            Some(name) => params.insert(name, *path_seg),
            None if pattern_seg == path_seg => {}
            None => return None,
        }
    }
    Some(params)
}

/// Substitute `params` into the `:param` segments of `pattern` and return the
/// canonical concrete path.
///
/// ```
/// use gpui_route_stack::matching::fill_pattern;
/// use gpui_route_stack::RouteParams;
///
/// let params = RouteParams::new().with("id", "42");
/// assert_eq!(fill_pattern("/users/:id", &params).unwrap(), "users/42");
/// assert!(fill_pattern("/users/:id", &RouteParams::new()).is_err());
/// ```
pub fn fill_pattern(pattern: &str, params: &RouteParams) -> NavigationResult<String> {
    let mut filled = Vec::new();
    for segment in split_path(pattern) {
        match param_name(segment) {
            Some(name) => {
                let value = params
                    .get(name)
                    .ok_or_else(|| NavigationError::MissingPathParameter {
                        name: pattern.to_string(),
                        parameter: name.to_string(),
                    })?;
                filled.push(value);
            }
            None => filled.push(segment),
        }
    }
    Ok(normalize_path(&filled.join("/")).into_owned())
}

/// Translate a `:param` pattern into the `{param}` syntax used by `matchit`.
///
/// The result always has a leading slash and no trailing slash.
pub(crate) fn to_matchit_pattern(pattern: &str) -> String {
    let segments: Vec<String> = split_path(pattern)
        .into_iter()
        .map(|segment| match param_name(segment) {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Render a canonical path back into a location with a leading slash.
pub(crate) fn to_location(path: &str, query: &QueryParams) -> String {
    let mut location = if path == ROOT_PATH {
        ROOT_PATH.to_string()
    } else {
        format!("/{}", path)
    };
    if !query.is_empty() {
        location.push('?');
        location.push_str(&query.to_query_string());
    }
    location
}
