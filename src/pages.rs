//! Page cache and builder.
//!
//! The host asks [`PageCache::materialize`] for the current list of pages on
//! every render pass. Each stack entry's cache key is looked up in the
//! previous generation of page shells:
//!
//! - **hit**: the shell (and with it the [`PageKey`] the rendering layer
//!   reconciles on) is reused, while the page content is rebuilt from the
//!   current route;
//! - **miss**: a new shell with a fresh page key is created.
//!
//! The new generation then replaces the old one in a single swap, which drops
//! every shell whose cache key left the stack.
//!
//! ```text
//! stack:    [home]  [product]  [product-2]
//!              │        │           │
//! previous: {home: #1, product: #2, other: #3}
//! next:     {home: #1, product: #2, product-2: #4}     (other dropped)
//! ```

use crate::cache_key::resolve_cache_key;
use crate::error::NotFoundHandler;
use crate::matching::match_pattern;
use crate::params::RouteParams;
use crate::registry::RouteRegistry;
use crate::route::{Route, RouteTemplate};
use crate::{debug_log, trace_log, warn_log};
use gpui::{AnyElement, App, Window};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Stable identity of a rendered page, used by the rendering layer for
/// reconciliation. Distinct from the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey(String);

impl PageKey {
    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Identity data of a cached page. Never holds page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageShell {
    key: PageKey,
    cache_key: String,
    fullscreen_dialog: bool,
    opaque: bool,
    maintain_state: bool,
}

impl PageShell {
    fn new(key: PageKey, cache_key: String, template: Option<&RouteTemplate>) -> Self {
        Self {
            key,
            cache_key,
            fullscreen_dialog: template.is_some_and(RouteTemplate::is_fullscreen_dialog),
            opaque: template.map_or(true, RouteTemplate::is_opaque),
            maintain_state: template.map_or(true, RouteTemplate::is_maintain_state),
        }
    }

    /// Reconciliation key.
    pub fn key(&self) -> &PageKey {
        &self.key
    }

    /// Cache key the shell is stored under.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn is_fullscreen_dialog(&self) -> bool {
        self.fullscreen_dialog
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn is_maintain_state(&self) -> bool {
        self.maintain_state
    }
}

/// A materialized page: a shell plus the route it currently shows.
#[derive(Clone)]
pub struct Page {
    shell: PageShell,
    route: Route,
    template: Option<Arc<RouteTemplate>>,
    not_found: Option<NotFoundHandler>,
}

impl Page {
    pub fn shell(&self) -> &PageShell {
        &self.shell
    }

    pub fn key(&self) -> &PageKey {
        &self.shell.key
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn template(&self) -> Option<&Arc<RouteTemplate>> {
        self.template.as_ref()
    }

    /// Build the page content for the current route.
    ///
    /// Entries without a template go to the registry's not-found handler, or
    /// to the built-in 404 page when none is set.
    pub fn render(&self, window: &mut Window, cx: &mut App) -> AnyElement {
        match (&self.template, &self.not_found) {
            (Some(template), _) => template.build_page(window, cx, &self.route),
            (None, Some(handler)) => handler(window, cx, &self.route),
            (None, None) => crate::widgets::not_found_page(&self.route),
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("shell", &self.shell)
            .field("route", &self.route)
            .field("template", &self.template.as_ref().map(|t| t.url()))
            .finish_non_exhaustive()
    }
}

/// Cache-key → page-shell map, swapped wholesale on every materialization.
///
/// A shell is stored under its cache key. When entries of one pass share a
/// cache key, the second and later ones are stored under `key#2`, `key#3`,
/// ... so their page keys stay the same from one pass to the next.
#[derive(Debug, Default)]
pub struct PageCache {
    shells: HashMap<String, PageShell>,
    serial: u64,
}

/// Bookkeeping for one materialization pass.
#[derive(Default)]
struct Pass {
    next: HashMap<String, PageShell>,
    occurrences: HashMap<String, usize>,
    uses: HashMap<String, usize>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the stack into pages, reusing shells whose cache key survived.
    ///
    /// Consecutive entries of the same group render as one page: only the
    /// last of the run is kept.
    pub fn materialize(&mut self, routes: &[Route], registry: &RouteRegistry) -> Vec<Page> {
        let mut pass = Pass::default();
        let pages = self.stack_pages(routes, registry, &mut pass);
        self.swap(pass);
        pages
    }

    /// [`materialize`](Self::materialize) with `overlay` drawn above the
    /// stack. The overlay never joins a group run of the stack.
    pub fn materialize_with_overlay(
        &mut self,
        routes: &[Route],
        overlay: &Route,
        registry: &RouteRegistry,
    ) -> Vec<Page> {
        let mut pass = Pass::default();
        let mut pages = self.stack_pages(routes, registry, &mut pass);
        pages.push(self.page_for(overlay, routes, registry, &mut pass));
        self.swap(pass);
        pages
    }

    /// Render `route` alone while the shells of the `hidden` entries stay
    /// cached, so they come back with the same page keys.
    pub fn materialize_override(
        &mut self,
        route: &Route,
        hidden: &[Route],
        registry: &RouteRegistry,
    ) -> Vec<Page> {
        let mut pass = Pass::default();
        let page = self.page_for(route, &[], registry, &mut pass);

        let hidden: HashSet<&str> = hidden.iter().filter_map(Route::cache_key).collect();
        let carried: Vec<String> = self
            .shells
            .iter()
            .filter(|(_, shell)| hidden.contains(shell.cache_key()))
            .map(|(slot, _)| slot.clone())
            .collect();
        for slot in carried {
            if let Some(shell) = self.shells.remove(&slot) {
                pass.next.entry(slot).or_insert(shell);
            }
        }

        self.swap(pass);
        vec![page]
    }

    fn stack_pages(
        &mut self,
        routes: &[Route],
        registry: &RouteRegistry,
        pass: &mut Pass,
    ) -> Vec<Page> {
        let mut pages = Vec::with_capacity(routes.len());
        for (index, route) in routes.iter().enumerate() {
            if routes
                .get(index + 1)
                .is_some_and(|above| route.same_group(above))
            {
                trace_log!("Skipping '{}', covered by its group sibling", route.path());
                continue;
            }
            pages.push(self.page_for(route, &routes[..index], registry, pass));
        }
        pages
    }

    fn page_for(
        &mut self,
        route: &Route,
        below: &[Route],
        registry: &RouteRegistry,
        pass: &mut Pass,
    ) -> Page {
        let template = registry.template_for(route);
        let route = match template.as_deref() {
            Some(template) => with_pattern_params(route, template),
            None => {
                warn_log!("No template for '{}', using not-found page", route.location());
                route.clone()
            }
        };
        let cache_key = route.cache_key().map_or_else(
            || resolve_cache_key(template.as_deref(), &route, below),
            str::to_string,
        );

        let ident = if route.label().is_empty() {
            route.path().to_string()
        } else {
            route.label().to_string()
        };
        let occurrence = count(&mut pass.occurrences, &ident);
        let uses = count(&mut pass.uses, &cache_key);
        let slot = if uses == 1 {
            cache_key.clone()
        } else {
            format!("{}#{}", cache_key, uses)
        };

        let shell = match self.shells.remove(&slot) {
            Some(shell) => {
                trace_log!("Reusing page '{}' for '{}'", shell.key, slot);
                shell
            }
            None => {
                if uses > 1 {
                    warn_log!(
                        "Cache key '{}' used by {} entries; keeping them as separate pages",
                        cache_key,
                        uses
                    );
                }
                self.new_shell(&ident, occurrence, cache_key, template.as_deref())
            }
        };
        pass.next.insert(slot, shell.clone());

        Page {
            shell,
            route,
            template,
            not_found: registry.not_found_handler().cloned(),
        }
    }

    fn swap(&mut self, pass: Pass) {
        let dropped = std::mem::replace(&mut self.shells, pass.next).len();
        if dropped > 0 {
            debug_log!("Dropped {} page shell(s) no longer on the stack", dropped);
        }
    }

    fn new_shell(
        &mut self,
        ident: &str,
        occurrence: usize,
        cache_key: String,
        template: Option<&RouteTemplate>,
    ) -> PageShell {
        self.serial += 1;
        let key = PageKey(format!("{}:{}:{}", ident, occurrence, self.serial));
        trace_log!("New page '{}' for cache key '{}'", key, cache_key);
        PageShell::new(key, cache_key, template)
    }

    /// Evict every shell cached under the route's cache key.
    pub fn clear_cached_route(&mut self, route: &Route) -> bool {
        let Some(key) = route.cache_key() else {
            return false;
        };
        let before = self.shells.len();
        self.shells.retain(|_, shell| shell.cache_key != key);
        let removed = self.shells.len() < before;
        if removed {
            trace_log!("Evicted page shell(s) for '{}'", key);
        }
        removed
    }

    /// Drop every shell.
    pub fn clear_cache(&mut self) {
        debug_log!("Clearing {} page shell(s)", self.shells.len());
        self.shells.clear();
    }

    pub fn contains(&self, cache_key: &str) -> bool {
        self.shells.values().any(|shell| shell.cache_key == cache_key)
    }

    pub fn shell(&self, cache_key: &str) -> Option<&PageShell> {
        self.shells.get(cache_key)
    }

    /// Cache key of the shell with the given page key.
    pub fn cache_key_for(&self, page: &PageKey) -> Option<&str> {
        self.shells
            .values()
            .find(|shell| &shell.key == page)
            .map(PageShell::cache_key)
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }
}

fn count(counter: &mut HashMap<String, usize>, key: &str) -> usize {
    let n = counter.entry(key.to_string()).or_insert(0);
    *n += 1;
    *n
}

fn with_pattern_params(route: &Route, template: &RouteTemplate) -> Route {
    match match_pattern(template.path(), route.path()) {
        Some(params) if !params.is_empty() => route
            .clone()
            .with_path_params(RouteParams::merge(route.path_params(), &params)),
        _ => route.clone(),
    }
}
