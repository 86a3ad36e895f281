//! Route values and route templates.
//!
//! A [`Route`] is one entry of the navigation stack: an immutable record of
//! where the user is (path, label, parameters, group) plus the cache key that
//! ties it to a page shell. Routes are never mutated in place; every
//! `with_*` method returns a new value that replaces the old one at its
//! stack index.
//!
//! A [`RouteTemplate`] is registered once at startup and describes how to
//! build the page for every route that resolves to it.
//!
//! # Identity
//!
//! Two routes are equal when both carry the same non-empty label, or when
//! both carry the same non-empty path. Query parameters, path parameters,
//! payloads and the cache key are deliberately left out, which is what lets a
//! query-only navigation update the visible page in place.
//!
//! ```
//! use gpui_route_stack::{QueryParams, Route};
//!
//! let a = Route::new("/product").with_query(QueryParams::new().with("id", "1"));
//! let b = Route::new("product/").with_query(QueryParams::new().with("id", "2"));
//! assert_eq!(a, b);
//! assert!(!a.same_data(&b));
//! ```

use crate::error::{NavigationError, NavigationResult};
use crate::matching::{normalize_path, split_location, to_location};
use crate::params::{QueryParams, RouteParams};
use gpui::{AnyElement, App, Window};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque payload attached to a route (arguments, page data, pop results).
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Page factory stored on a [`RouteTemplate`].
///
/// Invoked on every render pass with the current route, so query changes
/// reach the page without recreating its shell.
pub type PageBuilder = Arc<dyn Fn(&mut Window, &mut App, &Route) -> AnyElement + Send + Sync>;

// ============================================================================
// Route
// ============================================================================

/// One entry of the navigation stack.
#[derive(Clone, Default)]
pub struct Route {
    path: String,
    label: String,
    query: QueryParams,
    path_params: RouteParams,
    group: Option<String>,
    cache_key: Option<String>,
    arguments: Option<Payload>,
    data: Option<Payload>,
}

impl Route {
    /// Create a route for the given path. The path is canonicalized.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// Create a route from a location such as `/product?id=2`.
    pub fn from_location(location: &str) -> Self {
        let (path, query) = split_location(location);
        Self {
            path,
            query,
            ..Self::default()
        }
    }

    /// Canonical path (no leading or trailing slash, `"/"` for the root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Logical name, empty when unset.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Path parameters extracted from the template pattern.
    pub fn path_params(&self) -> &RouteParams {
        &self.path_params
    }

    /// Group shared with sibling routes, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Cache key assigned when the route was placed on the stack.
    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    /// Raw arguments payload.
    pub fn arguments(&self) -> Option<&Payload> {
        self.arguments.as_ref()
    }

    /// Arguments downcast to `T`.
    pub fn arguments_as<T: Any>(&self) -> Option<&T> {
        self.arguments.as_deref()?.downcast_ref()
    }

    /// Raw page-data payload.
    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    /// Page data downcast to `T`.
    pub fn data_as<T: Any>(&self) -> Option<&T> {
        self.data.as_deref()?.downcast_ref()
    }

    /// Location string with a leading slash and the query, e.g. `/product?id=1`.
    pub fn location(&self) -> String {
        to_location(&self.path, &self.query)
    }

    /// Copy with a different path.
    pub fn with_path(mut self, path: impl AsRef<str>) -> Self {
        self.path = normalize_path(path.as_ref()).into_owned();
        self
    }

    /// Copy with a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Copy with query parameters.
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Copy with path parameters.
    pub fn with_path_params(mut self, params: RouteParams) -> Self {
        self.path_params = params;
        self
    }

    /// Copy with a group.
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    /// Copy with an explicit cache key.
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Copy with the cache key cleared.
    pub fn without_cache_key(mut self) -> Self {
        self.cache_key = None;
        self
    }

    /// Copy with an arguments payload.
    pub fn with_arguments(mut self, arguments: Option<Payload>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Copy with a page-data payload.
    pub fn with_data(mut self, data: Option<Payload>) -> Self {
        self.data = data;
        self
    }

    /// `true` if both routes carry the same non-empty group.
    pub fn same_group(&self, other: &Route) -> bool {
        matches!((&self.group, &other.group), (Some(a), Some(b)) if a == b)
    }

    /// `true` if `other` occupies the same stack slot: equal by identity, or
    /// a member of the same group.
    pub fn same_slot(&self, other: &Route) -> bool {
        self == other || self.same_group(other)
    }

    /// `true` if the rendering-relevant data (path, query, path parameters)
    /// is identical.
    pub fn same_data(&self, other: &Route) -> bool {
        self.path == other.path
            && self.query == other.query
            && self.path_params == other.path_params
    }

    /// Match against a user-facing name: a label, or a location whose path
    /// equals this route's path.
    pub fn matches_name(&self, name: &str) -> bool {
        if name.starts_with('/') {
            let (path, _) = split_location(name);
            path == self.path
        } else {
            !self.label.is_empty() && self.label == name
        }
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        let by_label = !self.label.is_empty() && self.label == other.label;
        let by_path = !self.path.is_empty() && self.path == other.path;
        by_label || by_path
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("label", &self.label)
            .field("query", &self.query)
            .field("path_params", &self.path_params)
            .field("group", &self.group)
            .field("cache_key", &self.cache_key)
            .field("arguments", &self.arguments.is_some())
            .field("data", &self.data.is_some())
            .finish()
    }
}

// ============================================================================
// RouteTemplate
// ============================================================================

/// A registered route: url pattern, optional label and group, default query
/// parameters, metadata and the page builder.
///
/// # Example
///
/// ```no_run
/// use gpui::IntoElement;
/// use gpui_route_stack::RouteTemplate;
///
/// let template = RouteTemplate::new("/users/:id", |_window, _cx, route| {
///     gpui::div().into_any_element()
/// })
/// .label("user")
/// .group("people");
/// assert_eq!(template.path(), "users/:id");
/// ```
pub struct RouteTemplate {
    url: String,
    path: String,
    label: Option<String>,
    group: Option<String>,
    query: QueryParams,
    metadata: HashMap<String, String>,
    builder: PageBuilder,
    fullscreen_dialog: bool,
    opaque: bool,
    maintain_state: bool,
}

impl RouteTemplate {
    /// Create a template.
    ///
    /// # Panics
    ///
    /// Panics if `url` does not start with `/`. Use [`try_new`](Self::try_new)
    /// to get an error instead.
    pub fn new<F>(url: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&mut Window, &mut App, &Route) -> AnyElement + Send + Sync + 'static,
    {
        let url = url.into();
        assert!(
            url.starts_with('/'),
            "route template url must start with '/': {url}"
        );
        Self::build(url, Arc::new(builder))
    }

    /// Create a template, failing with [`NavigationError::InvalidTemplate`]
    /// if `url` does not start with `/`.
    pub fn try_new<F>(url: impl Into<String>, builder: F) -> NavigationResult<Self>
    where
        F: Fn(&mut Window, &mut App, &Route) -> AnyElement + Send + Sync + 'static,
    {
        let url = url.into();
        if !url.starts_with('/') {
            return Err(NavigationError::InvalidTemplate { url });
        }
        Ok(Self::build(url, Arc::new(builder)))
    }

    fn build(url: String, builder: PageBuilder) -> Self {
        let (path, query) = split_location(&url);
        Self {
            url,
            path,
            label: None,
            group: None,
            query,
            metadata: HashMap::new(),
            builder,
            fullscreen_dialog: false,
            opaque: true,
            maintain_state: true,
        }
    }

    /// Set the label used for name lookups.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Put the template in a group; all its routes share one cache key.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Add a default query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Add a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Mark pages as full-screen dialogs.
    pub fn fullscreen_dialog(mut self, value: bool) -> Self {
        self.fullscreen_dialog = value;
        self
    }

    /// Whether pages hide everything below them (default `true`).
    pub fn opaque(mut self, value: bool) -> Self {
        self.opaque = value;
        self
    }

    /// Whether pages keep their state while covered (default `true`).
    pub fn maintain_state(mut self, value: bool) -> Self {
        self.maintain_state = value;
        self
    }

    /// Url as registered, including any default query.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Canonical path pattern (may contain `:param` segments).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical location (path plus default query) used for exact uri lookups.
    pub fn uri(&self) -> String {
        to_location(&self.path, &self.query)
    }

    /// Label, if any.
    pub fn label_name(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Group, if any.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Default query parameters.
    pub fn default_query(&self) -> &QueryParams {
        &self.query
    }

    /// Metadata map.
    pub fn metadata_map(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Full-screen dialog flag.
    pub fn is_fullscreen_dialog(&self) -> bool {
        self.fullscreen_dialog
    }

    /// Opaque flag.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Maintain-state flag.
    pub fn is_maintain_state(&self) -> bool {
        self.maintain_state
    }

    /// Invoke the page builder.
    pub fn build_page(&self, window: &mut Window, cx: &mut App, route: &Route) -> AnyElement {
        (self.builder)(window, cx, route)
    }
}

impl fmt::Debug for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTemplate")
            .field("url", &self.url)
            .field("label", &self.label)
            .field("group", &self.group)
            .field("query", &self.query)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::IntoElement;

    fn template(url: &str) -> RouteTemplate {
        RouteTemplate::new(url, |_, _, _| gpui::div().into_any_element())
    }

    #[test]
    fn test_equality_by_label() {
        let a = Route::new("/a").with_label("home");
        let b = Route::new("/b").with_label("home");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_ignores_parameters_and_key() {
        let a = Route::new("/product")
            .with_query(QueryParams::new().with("id", "1"))
            .with_cache_key("product");
        let b = Route::new("/product").with_query(QueryParams::new().with("id", "2"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_inequality_by_path() {
        assert_ne!(Route::new("/a"), Route::new("/b"));
    }

    #[test]
    fn test_empty_path_never_equal() {
        let a = Route::default();
        let b = Route::default();
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_slot_by_group() {
        let home = Route::new("/").with_group(Some("home".into()));
        let games = Route::new("/games").with_group(Some("home".into()));
        assert!(home.same_slot(&games));
        assert!(!home.same_slot(&Route::new("/games")));
    }

    #[test]
    fn test_from_location() {
        let route = Route::from_location("/product/?id=7");
        assert_eq!(route.path(), "product");
        assert_eq!(route.query().get("id"), Some("7"));
        assert_eq!(route.location(), "/product?id=7");
    }

    #[test]
    fn test_payload_downcast() {
        let route = Route::new("/a").with_arguments(Some(Arc::new(42_u32)));
        assert_eq!(route.arguments_as::<u32>(), Some(&42));
        assert_eq!(route.arguments_as::<String>(), None);
        assert!(route.data_as::<u32>().is_none());
    }

    #[test]
    fn test_matches_name() {
        let route = Route::new("/settings").with_label("settings");
        assert!(route.matches_name("/settings?tab=1"));
        assert!(route.matches_name("settings"));
        assert!(!route.matches_name("/other"));
        assert!(!Route::new("/x").matches_name(""));
    }

    #[test]
    fn test_template_try_new_rejects_relative_url() {
        let result = RouteTemplate::try_new("users", |_, _, _| gpui::div().into_any_element());
        assert!(matches!(
            result,
            Err(NavigationError::InvalidTemplate { url }) if url == "users"
        ));
    }

    #[test]
    #[should_panic(expected = "must start with '/'")]
    fn test_template_new_panics_on_relative_url() {
        let _ = template("users");
    }

    #[test]
    fn test_template_url_with_default_query() {
        let t = template("/search?tab=all").label("search");
        assert_eq!(t.path(), "search");
        assert_eq!(t.default_query().get("tab"), Some("all"));
        assert_eq!(t.uri(), "/search?tab=all");
        assert_eq!(t.label_name(), Some("search"));
    }
}
