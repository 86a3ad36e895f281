//! Route-name resolution.
//!
//! [`RouteRegistry`] holds the static list of [`RouteTemplate`]s and turns a
//! user-facing name into a concrete [`Route`]:
//!
//! - a name without a leading `/` is a **label** and must match a template
//!   label exactly;
//! - a name with a leading `/` and a `:param` segment names a **pattern**;
//!   the caller's path parameters are substituted into it;
//! - any other name is a **location** (`/path?query`), matched in order by
//!   exact uri (path plus query), exact path, then `:param` pattern.
//!
//! Query parameters are layered: template defaults, then the query in the
//! location, then the explicit query passed by the caller. Later layers win.
//!
//! ```no_run
//! use gpui::IntoElement;
//! use gpui_route_stack::{QueryParams, RouteParams, RouteRegistry, RouteTemplate};
//!
//! let mut registry = RouteRegistry::new();
//! registry.add_route(
//!     RouteTemplate::new("/users/:id", |_, _, _| gpui::div().into_any_element()).label("user"),
//! );
//!
//! let params = RouteParams::new().with("id", "7");
//! let resolved = registry.resolve("user", &params, &QueryParams::new()).unwrap();
//! assert_eq!(resolved.route.path(), "users/7");
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolveCache};
use crate::error::{NavigationError, NavigationResult, NotFoundHandler};
use crate::matching::{
    fill_pattern, is_pattern, match_pattern, split_location, to_location, to_matchit_pattern,
};
use crate::params::{QueryParams, RouteParams};
use crate::route::{Route, RouteTemplate};
use crate::{debug_log, info_log, trace_log, warn_log};
use gpui::{AnyElement, App, Window};
use std::collections::HashMap;
#[cfg(feature = "cache")]
use std::sync::Mutex;
use std::sync::Arc;

/// A name resolved to its template and concrete route.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    /// Template the name resolved to.
    pub template: Arc<RouteTemplate>,
    /// Route built from the template, without a cache key.
    pub route: Route,
}

/// Registered templates plus the lookup indexes built from them.
pub struct RouteRegistry {
    templates: Vec<Arc<RouteTemplate>>,
    by_label: HashMap<String, usize>,
    by_uri: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
    patterns: matchit::Router<usize>,
    not_found: Option<NotFoundHandler>,
    #[cfg(feature = "cache")]
    memo: Mutex<ResolveCache>,
}

impl RouteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            by_label: HashMap::new(),
            by_uri: HashMap::new(),
            by_path: HashMap::new(),
            patterns: matchit::Router::new(),
            not_found: None,
            #[cfg(feature = "cache")]
            memo: Mutex::new(ResolveCache::new()),
        }
    }

    /// Register a template.
    ///
    /// A later template with the same label or path shadows the earlier one
    /// for lookups.
    pub fn add_route(&mut self, template: RouteTemplate) {
        let index = self.templates.len();

        if let Some(label) = template.label_name() {
            if self.by_label.insert(label.to_string(), index).is_some() {
                warn_log!("Label '{}' registered twice, last one wins", label);
            }
        }
        self.by_uri.insert(template.uri(), index);
        self.by_path.insert(template.path().to_string(), index);
        if is_pattern(template.path()) {
            if let Err(err) = self
                .patterns
                .insert(to_matchit_pattern(template.path()), index)
            {
                warn_log!(
                    "Pattern '{}' conflicts with an existing template: {}",
                    template.url(),
                    err
                );
            }
        }

        info_log!(
            "Registered template '{}' (label: {:?}, group: {:?})",
            template.url(),
            template.label_name(),
            template.group_name()
        );
        self.templates.push(Arc::new(template));

        #[cfg(feature = "cache")]
        if let Ok(mut memo) = self.memo.lock() {
            memo.clear();
        }
    }

    /// Builder-style [`add_route`](Self::add_route).
    pub fn with_route(mut self, template: RouteTemplate) -> Self {
        self.add_route(template);
        self
    }

    /// Set the fallback page factory for routes without a template.
    pub fn on_not_found<F>(&mut self, handler: F)
    where
        F: Fn(&mut Window, &mut App, &Route) -> AnyElement + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
    }

    /// Fallback page factory, if one was set.
    pub fn not_found_handler(&self) -> Option<&NotFoundHandler> {
        self.not_found.as_ref()
    }

    /// All registered templates in registration order.
    pub fn templates(&self) -> &[Arc<RouteTemplate>] {
        &self.templates
    }

    /// Memo statistics.
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.memo
            .lock()
            .map(|memo| memo.stats().clone())
            .unwrap_or_default()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve a name into a route.
    ///
    /// `path_params` fill `:param` segments of a label or pattern name;
    /// `query` overrides template and location query parameters.
    pub fn resolve(
        &self,
        name: &str,
        path_params: &RouteParams,
        query: &QueryParams,
    ) -> NavigationResult<ResolvedRoute> {
        let not_found = || NavigationError::RouteNotFound {
            name: name.to_string(),
        };

        let (template, path, location_query) = if name.starts_with('/') {
            let (path, location_query) = split_location(name);
            if is_pattern(&path) {
                let template = self.by_path.get(&path).ok_or_else(not_found)?;
                let template = Arc::clone(&self.templates[*template]);
                let path = fill_pattern(template.path(), path_params)?;
                (template, path, location_query)
            } else {
                let (index, _) = self.lookup_location(&path, &location_query).ok_or_else(not_found)?;
                (Arc::clone(&self.templates[index]), path, location_query)
            }
        } else {
            let index = self.lookup_label(name).ok_or_else(not_found)?;
            let template = Arc::clone(&self.templates[index]);
            let path = fill_pattern(template.path(), path_params)?;
            (template, path, QueryParams::new())
        };

        let query = QueryParams::merge(
            &QueryParams::merge(template.default_query(), &location_query),
            query,
        );
        let route = Self::route_for(&template, path, query);
        debug_log!("Resolved '{}' to '{}'", name, route.location());
        Ok(ResolvedRoute { template, route })
    }

    /// Resolve a platform location (`/path?query`) without extra parameters.
    pub fn resolve_location(&self, location: &str) -> NavigationResult<ResolvedRoute> {
        self.resolve(location, &RouteParams::new(), &QueryParams::new())
    }

    /// Find the template a stack entry belongs to: by label, then by path.
    pub fn template_for(&self, route: &Route) -> Option<Arc<RouteTemplate>> {
        if !route.label().is_empty() {
            if let Some(index) = self.by_label.get(route.label()) {
                return Some(Arc::clone(&self.templates[*index]));
            }
        }
        self.lookup_location(route.path(), route.query())
            .map(|(index, _)| Arc::clone(&self.templates[index]))
    }

    /// Attach a ready-made route to its template.
    ///
    /// Label, group and `:param` values are taken from the template, the way
    /// [`resolve`](Self::resolve) builds them. Query, payloads and cache key
    /// are kept. Routes without a template come back unchanged.
    pub fn bind(&self, route: Route) -> (Option<Arc<RouteTemplate>>, Route) {
        let Some(template) = self.template_for(&route) else {
            return (None, route);
        };
        let label = template
            .label_name()
            .map_or_else(|| route.label().to_string(), str::to_string);
        let params = match match_pattern(template.path(), route.path()) {
            Some(matched) => RouteParams::merge(&matched, route.path_params()),
            None => route.path_params().clone(),
        };
        let route = route
            .with_label(label)
            .with_group(template.group_name().map(str::to_string))
            .with_path_params(params);
        (Some(template), route)
    }

    fn route_for(template: &RouteTemplate, path: String, query: QueryParams) -> Route {
        let params = match_pattern(template.path(), &path).unwrap_or_default();
        Route::new(path)
            .with_label(template.label_name().unwrap_or_default())
            .with_group(template.group_name().map(str::to_string))
            .with_query(query)
            .with_path_params(params)
    }

    fn lookup_label(&self, label: &str) -> Option<usize> {
        self.by_label.get(label).copied()
    }

    /// Match a canonical path (and its query) to a template index.
    ///
    /// Order: exact uri, exact path, `:param` pattern.
    fn lookup_location(&self, path: &str, query: &QueryParams) -> Option<(usize, RouteParams)> {
        let uri = to_location(path, query);

        #[cfg(feature = "cache")]
        if let Ok(mut memo) = self.memo.lock() {
            if let Some(index) = memo.get(&uri) {
                let params = match_pattern(self.templates[index].path(), path).unwrap_or_default();
                return Some((index, params));
            }
        }

        let found = self.scan_location(path, &uri);

        #[cfg(feature = "cache")]
        if let (Some((index, _)), Ok(mut memo)) = (&found, self.memo.lock()) {
            memo.insert(uri, *index);
        }

        found
    }

    fn scan_location(&self, path: &str, uri: &str) -> Option<(usize, RouteParams)> {
        if let Some(index) = self.by_uri.get(uri) {
            trace_log!("'{}' matched template uri exactly", uri);
            return Some((*index, RouteParams::new()));
        }
        if let Some(index) = self.by_path.get(path) {
            if !is_pattern(self.templates[*index].path()) {
                trace_log!("'{}' matched template path exactly", path);
                return Some((*index, RouteParams::new()));
            }
        }
        let lookup = format!("/{}", path);
        let matched = self.patterns.at(&lookup).ok()?;
        let params: RouteParams = matched.params.iter().collect();
        trace_log!("'{}' matched pattern '{}'", path, self.templates[*matched.value].url());
        Some((*matched.value, params))
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("templates", &self.templates)
            .field("not_found", &self.not_found.is_some())
            .finish_non_exhaustive()
    }
}
