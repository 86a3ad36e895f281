//! Route-stack manager.
//!
//! [`NavigationStack`] owns the ordered list of [`Route`]s (index 0 is the
//! root, the last entry is the visible page) together with the
//! [`PageCache`] that renders it. It is never empty once constructed.
//!
//! # Push policy
//!
//! A push resolves the name, then picks one of three placements:
//!
//! | Situation                                                  | Result                                   |
//! |------------------------------------------------------------|------------------------------------------|
//! | top entry has the same path, or the same group             | top updated in place, cache key kept     |
//! | a deeper entry is the same route with the same data, or shares the group | entries above it dropped, entry updated in place |
//! | otherwise (including a deeper match with other query data) | new entry, duplicate-indexed cache key   |
//!
//! [`PushOptions::allow_duplicates`] skips the first two rows.
//!
//! # Completion futures
//!
//! Every push returns a [`PushFuture`]. It resolves with
//! [`PushOutcome::Popped`] carrying the pop result when the entry is popped,
//! or with [`PushOutcome::Removed`] when the entry leaves the stack any other
//! way (remove, replace, set, history collapse).
//!
//! # Notifications
//!
//! Listeners registered with [`NavigationStack::add_listener`] run
//! synchronously after every applied mutation. Subscribers from
//! [`NavigationStack::subscribe`] receive a [`RouteChange`] whenever the
//! visible route changes. Passing `apply(false)` or calling
//! [`NavigationStack::defer`] batches mutations until
//! [`NavigationStack::apply`] flushes exactly one notification.

use crate::cache_key::resolve_cache_key;
use crate::error::{NavigationError, NavigationResult};
use crate::pages::{Page, PageCache, PageKey};
use crate::params::{QueryParams, RouteParams};
use crate::registry::RouteRegistry;
use crate::route::{Payload, Route, RouteTemplate};
use crate::{debug_log, error_log, trace_log, warn_log};
use futures::channel::{mpsc, oneshot};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

// ============================================================================
// Options and events
// ============================================================================

/// Options for push-like operations.
#[derive(Clone)]
pub struct PushOptions {
    query: QueryParams,
    path_params: RouteParams,
    arguments: Option<Payload>,
    data: Option<Payload>,
    cache_key: Option<String>,
    allow_duplicates: bool,
    apply: bool,
}

impl PushOptions {
    pub fn new() -> Self {
        Self {
            query: QueryParams::new(),
            path_params: RouteParams::new(),
            arguments: None,
            data: None,
            cache_key: None,
            allow_duplicates: false,
            apply: true,
        }
    }

    /// Add a query parameter. Overrides template and location defaults.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Add a value for a `:param` segment.
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key, value);
        self
    }

    pub fn with_path_params(mut self, params: RouteParams) -> Self {
        self.path_params = params;
        self
    }

    /// Attach arguments, readable through [`Route::arguments_as`].
    pub fn arguments<T: Any + Send + Sync>(mut self, arguments: T) -> Self {
        self.arguments = Some(Arc::new(arguments));
        self
    }

    /// Attach page data, readable through [`Route::data_as`].
    pub fn data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Use an explicit cache key. Explicit keys are never indexed.
    ///
    /// A push that updates an existing entry in place keeps that entry's key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Always create a new stack entry, even for a route already on the stack.
    pub fn allow_duplicates(mut self, value: bool) -> Self {
        self.allow_duplicates = value;
        self
    }

    /// Notify listeners right away (default) or defer until
    /// [`NavigationStack::apply`].
    pub fn apply(mut self, value: bool) -> Self {
        self.apply = value;
        self
    }
}

impl Default for PushOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`NavigationStack::pop`].
#[derive(Clone)]
pub struct PopOptions {
    result: Option<Payload>,
    all: bool,
    apply: bool,
}

impl PopOptions {
    pub fn new() -> Self {
        Self {
            result: None,
            all: false,
            apply: true,
        }
    }

    /// Value delivered to the popped entry's [`PushFuture`].
    pub fn result<T: Any + Send + Sync>(mut self, result: T) -> Self {
        self.result = Some(Arc::new(result));
        self
    }

    pub fn result_payload(mut self, result: Option<Payload>) -> Self {
        self.result = result;
        self
    }

    /// Pop every entry above the root.
    pub fn all(mut self, value: bool) -> Self {
        self.all = value;
        self
    }

    pub fn apply(mut self, value: bool) -> Self {
        self.apply = value;
        self
    }
}

impl Default for PopOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Emitted to subscribers when the visible route changes.
#[derive(Debug, Clone)]
pub struct RouteChange {
    /// Route visible at the previous notification.
    pub previous: Option<Route>,
    /// Route visible now.
    pub current: Route,
}

/// How a pushed entry left the stack.
#[derive(Debug, Clone)]
pub enum PushOutcome {
    /// Popped, with the result passed to the pop.
    Popped(Option<Payload>),
    /// Removed without a pop.
    Removed,
}

impl PushOutcome {
    /// Pop result downcast to `T`.
    pub fn result_as<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Popped(Some(result)) => result.downcast_ref(),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// Resolves when the pushed entry leaves the stack.
#[must_use = "dropping the future does not cancel the navigation, but its outcome is lost"]
pub struct PushFuture {
    receiver: oneshot::Receiver<PushOutcome>,
}

impl Future for PushFuture {
    type Output = PushOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(PushOutcome::Removed),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl std::fmt::Debug for PushFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushFuture").finish_non_exhaustive()
    }
}

/// Synchronous stack-changed callback.
pub type StackListener = Box<dyn Fn(&[Route]) + Send + Sync>;

type EntryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// In-place update on the top, history collapse on a same-data match.
    Default,
    /// Always a new entry.
    Duplicate,
    /// Collapse onto any entry of the same slot, whatever its data.
    Collapse,
}

// ============================================================================
// NavigationStack
// ============================================================================

/// Ordered route stack plus the page cache that renders it.
pub struct NavigationStack {
    registry: Arc<RouteRegistry>,
    routes: Vec<Route>,
    /// Per-entry ids, parallel to `routes`. Completion futures follow the
    /// entry, not its cache key, which several entries may share.
    entries: Vec<EntryId>,
    next_entry: EntryId,
    pages: PageCache,
    pending: HashMap<EntryId, Vec<oneshot::Sender<PushOutcome>>>,
    subscribers: Vec<mpsc::UnboundedSender<RouteChange>>,
    listeners: Vec<StackListener>,
    override_route: Option<Route>,
    overlay_route: Option<Route>,
    can_pop: bool,
    deferred: bool,
    dirty: bool,
    last_notified: Option<Route>,
}

impl NavigationStack {
    /// Create a stack seeded from the platform's initial location.
    ///
    /// An unknown location still produces a stack entry, rendered by the
    /// not-found page.
    pub fn new(registry: Arc<RouteRegistry>, initial_location: &str) -> Self {
        let (template, route) = resolve_or_unknown(&registry, initial_location);
        let key = resolve_cache_key(template.as_deref(), &route, &[]);
        let route = route.with_cache_key(key);
        debug_log!("Route stack seeded with '{}'", route.location());

        Self {
            registry,
            routes: vec![route.clone()],
            entries: vec![0],
            next_entry: 1,
            pages: PageCache::new(),
            pending: HashMap::new(),
            subscribers: Vec::new(),
            listeners: Vec::new(),
            override_route: None,
            overlay_route: None,
            can_pop: true,
            deferred: false,
            dirty: false,
            last_notified: Some(route),
        }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Visible route.
    pub fn current(&self) -> &Route {
        self.routes.last().expect("route stack is never empty")
    }

    /// Snapshot of the whole stack, root first.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Always `false`; present for API symmetry with [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `true` if a pop would do something.
    pub fn can_pop(&self) -> bool {
        self.can_pop && self.routes.len() > 1
    }

    /// Enable or disable popping.
    pub fn set_can_pop(&mut self, value: bool) {
        self.can_pop = value;
    }

    /// Page cache backing [`materialize`](Self::materialize).
    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    // ------------------------------------------------------------------------
    // Push
    // ------------------------------------------------------------------------

    /// Push a route by label, pattern or location.
    pub fn push(&mut self, name: &str, options: PushOptions) -> NavigationResult<PushFuture> {
        let (template, route) = self.resolve(name, &options)?;
        let placement = if options.allow_duplicates {
            Placement::Duplicate
        } else {
            Placement::Default
        };
        let index = self.place(route, Some(&*template), placement);
        let future = self.register_pending(index);
        self.notify(options.apply);
        Ok(future)
    }

    /// Navigate to a platform location (deep link, URL change).
    ///
    /// Collapses history onto any entry for the same route. A location that
    /// matches no template becomes an unknown-route entry instead of failing.
    pub fn navigate_to_location(&mut self, location: &str) -> PushFuture {
        let (template, route) = resolve_or_unknown(&self.registry, location);
        let index = self.place(route, template.as_deref(), Placement::Collapse);
        let future = self.register_pending(index);
        self.notify(true);
        future
    }

    /// Remove entries from the top until `keep` matches, then push `name`.
    ///
    /// With no matching entry the whole stack is replaced by the new route.
    pub fn push_and_remove_until<P>(
        &mut self,
        name: &str,
        options: PushOptions,
        keep: P,
    ) -> NavigationResult<PushFuture>
    where
        P: Fn(&Route) -> bool,
    {
        let (template, route) = self.resolve(name, &options)?;
        let first_removed = self.routes.iter().rposition(keep).map_or(0, |index| index + 1);
        for index in (first_removed..self.routes.len()).rev() {
            self.remove_at(index, PushOutcome::Removed);
        }
        debug_log!(
            "push_and_remove_until: kept {} entr(ies) below '{}'",
            first_removed,
            route.path()
        );

        let placement = if options.allow_duplicates {
            Placement::Duplicate
        } else {
            Placement::Default
        };
        let index = self.place(route, Some(&*template), placement);
        let future = self.register_pending(index);
        self.notify(options.apply);
        Ok(future)
    }

    // ------------------------------------------------------------------------
    // Pop
    // ------------------------------------------------------------------------

    /// Pop the visible entry (or every entry above the root with `all`).
    ///
    /// Returns `false` without touching the stack when popping is disabled
    /// or only one entry remains. Hosts treat `false` as "leave the app".
    pub fn pop(&mut self, options: PopOptions) -> bool {
        if !self.can_pop {
            debug_log!("pop: popping is disabled");
            return false;
        }
        if self.routes.len() <= 1 {
            debug_log!("pop: only the root entry remains");
            return false;
        }

        let count = if options.all { self.routes.len() - 1 } else { 1 };
        let mut result = options.result;
        for _ in 0..count {
            let index = self.routes.len() - 1;
            let popped = self.remove_at(index, PushOutcome::Popped(result.take()));
            debug_log!("pop: '{}'", popped.location());
        }
        self.notify(options.apply);
        true
    }

    /// Pop until the visible entry matches `name` (a label or location path).
    pub fn pop_until(&mut self, name: &str, inclusive: bool) -> usize {
        self.pop_until_where(|route| route.matches_name(name), inclusive)
    }

    /// Pop until the visible entry satisfies `predicate`; with `inclusive`
    /// the matching entry is popped too. Never pops the root.
    ///
    /// Returns the number of popped entries.
    pub fn pop_until_where<P>(&mut self, predicate: P, inclusive: bool) -> usize
    where
        P: Fn(&Route) -> bool,
    {
        if !self.can_pop {
            return 0;
        }
        let target = match self.routes.iter().rposition(predicate) {
            Some(index) if inclusive => index,
            Some(index) => index + 1,
            None => 1,
        }
        .max(1);

        let mut popped = 0;
        while self.routes.len() > target {
            let index = self.routes.len() - 1;
            self.remove_at(index, PushOutcome::Popped(None));
            popped += 1;
        }
        if popped > 0 {
            debug_log!("pop_until: popped {} entr(ies)", popped);
            self.notify(true);
        }
        popped
    }

    /// Host back-gesture hook: pop the page with the given key.
    ///
    /// Returns whether the pop was handled.
    pub fn on_pop_page(&mut self, page: &PageKey, result: Option<Payload>) -> bool {
        if self.is_page_of(page, self.override_route.as_ref()) {
            return self.remove_override();
        }
        if self.is_page_of(page, self.overlay_route.as_ref()) {
            return self.remove_overlay();
        }

        let Some(cache_key) = self.pages.cache_key_for(page).map(str::to_string) else {
            warn_log!("on_pop_page: no page '{}' on the stack", page);
            return false;
        };
        if self.current().cache_key() == Some(cache_key.as_str()) {
            return self.pop(PopOptions::new().result_payload(result));
        }
        match self.index_of_key(&cache_key) {
            Some(index) if self.can_pop && self.routes.len() > 1 => {
                self.remove_at(index, PushOutcome::Popped(result));
                self.notify(true);
                true
            }
            _ => false,
        }
    }

    fn is_page_of(&self, page: &PageKey, route: Option<&Route>) -> bool {
        route
            .and_then(Route::cache_key)
            .is_some_and(|key| self.pages.cache_key_for(page) == Some(key))
    }

    // ------------------------------------------------------------------------
    // Replace and remove
    // ------------------------------------------------------------------------

    /// Replace the visible entry with `name`.
    pub fn replace(&mut self, name: &str, options: PushOptions) -> NavigationResult<PushFuture> {
        let index = self.routes.len() - 1;
        self.replace_at(index, name, options)
    }

    /// Replace `old` (found by cache key, then by identity) with `name`,
    /// keeping its position.
    pub fn replace_route(
        &mut self,
        old: &Route,
        name: &str,
        options: PushOptions,
    ) -> NavigationResult<PushFuture> {
        let index = self.index_of(old)?;
        self.replace_at(index, name, options)
    }

    fn replace_at(
        &mut self,
        index: usize,
        name: &str,
        options: PushOptions,
    ) -> NavigationResult<PushFuture> {
        let (template, route) = self.resolve(name, &options)?;
        let old = self.remove_at(index, PushOutcome::Removed);
        let key = resolve_cache_key(Some(&*template), &route, &self.routes);
        debug_log!(
            "replace: '{}' -> '{}' (key '{}')",
            old.location(),
            route.location(),
            key
        );
        self.insert_entry(index, route.with_cache_key(key));
        let future = self.register_pending(index);
        self.notify(options.apply);
        Ok(future)
    }

    /// Remove one entry. Fails with [`NavigationError::EmptyStack`] if it is
    /// the last one.
    pub fn remove_route(&mut self, route: &Route) -> NavigationResult<()> {
        let index = self.index_of(route)?;
        if self.routes.len() == 1 {
            error_log!("remove_route: refusing to remove the last entry");
            return Err(NavigationError::EmptyStack);
        }
        let removed = self.remove_at(index, PushOutcome::Removed);
        debug_log!("remove_route: '{}'", removed.location());
        self.notify(true);
        Ok(())
    }

    /// Remove the entry directly below `route`. Returns `false` if `route` is
    /// the root.
    pub fn remove_below(&mut self, route: &Route) -> NavigationResult<bool> {
        let index = self.index_of(route)?;
        if index == 0 {
            return Ok(false);
        }
        self.remove_at(index - 1, PushOutcome::Removed);
        self.notify(true);
        Ok(true)
    }

    /// Remove the entry directly above `route`. Returns `false` if `route` is
    /// the visible entry.
    pub fn remove_above(&mut self, route: &Route) -> NavigationResult<bool> {
        let index = self.index_of(route)?;
        if index + 1 >= self.routes.len() {
            return Ok(false);
        }
        self.remove_at(index + 1, PushOutcome::Removed);
        self.notify(true);
        Ok(true)
    }

    /// Remove every entry of `group`. Returns the number removed.
    pub fn remove_group(&mut self, group: &str) -> NavigationResult<usize> {
        let in_group = |route: &Route| route.group() == Some(group);
        if self.routes.iter().all(in_group) {
            error_log!("remove_group: '{}' covers the whole stack", group);
            return Err(NavigationError::EmptyStack);
        }

        let mut removed = 0;
        for index in (0..self.routes.len()).rev() {
            if in_group(&self.routes[index]) {
                self.remove_at(index, PushOutcome::Removed);
                removed += 1;
            }
        }
        if removed > 0 {
            debug_log!("remove_group: removed {} '{}' entr(ies)", removed, group);
            self.notify(true);
        }
        Ok(removed)
    }

    /// Move an existing entry to the top, keeping its cache key and pending
    /// future.
    pub fn reorder_to_top(&mut self, route: &Route) -> NavigationResult<()> {
        let index = self.index_of(route)?;
        let entry = self.routes.remove(index);
        let id = self.entries.remove(index);
        debug_log!("reorder_to_top: '{}' from index {}", entry.location(), index);
        self.routes.push(entry);
        self.entries.push(id);
        self.notify(true);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Wholesale replacement
    // ------------------------------------------------------------------------

    /// Replace the whole stack with the given names, root first.
    pub fn set(&mut self, names: &[&str]) -> NavigationResult<()> {
        if names.is_empty() {
            error_log!("set: refusing to leave the stack empty");
            return Err(NavigationError::EmptyStack);
        }
        let entries = names
            .iter()
            .map(|name| {
                let resolved = self.registry.resolve(name, &RouteParams::new(), &QueryParams::new())?;
                Ok((Some(resolved.template), resolved.route))
            })
            .collect::<NavigationResult<Vec<_>>>()?;
        self.rebuild(entries);
        Ok(())
    }

    /// Replace the whole stack with ready-made routes, root first.
    ///
    /// Existing cache keys on the routes are discarded and rebuilt. Label,
    /// group and path parameters are refreshed from each route's template.
    pub fn set_routes(&mut self, routes: Vec<Route>) -> NavigationResult<()> {
        if routes.is_empty() {
            error_log!("set_routes: refusing to leave the stack empty");
            return Err(NavigationError::EmptyStack);
        }
        let entries = routes
            .into_iter()
            .map(|route| self.registry.bind(route))
            .collect();
        self.rebuild(entries);
        Ok(())
    }

    fn rebuild(&mut self, entries: Vec<(Option<Arc<RouteTemplate>>, Route)>) {
        self.release_all();
        self.pages.clear_cache();
        self.routes.clear();
        self.entries.clear();
        for (template, route) in entries {
            let route = route.without_cache_key();
            let key = resolve_cache_key(template.as_deref(), &route, &self.routes);
            self.push_entry(route.with_cache_key(key));
        }
        debug_log!("set: stack rebuilt with {} entr(ies)", self.routes.len());
        self.notify(true);
    }

    /// Replace everything below the visible entry, which stays untouched.
    pub fn set_backstack(&mut self, names: &[&str]) -> NavigationResult<()> {
        let entries = names
            .iter()
            .map(|name| self.registry.resolve(name, &RouteParams::new(), &QueryParams::new()))
            .collect::<NavigationResult<Vec<_>>>()?;

        for index in (0..self.routes.len() - 1).rev() {
            self.remove_at(index, PushOutcome::Removed);
        }
        for resolved in entries {
            let key = resolve_cache_key(Some(&*resolved.template), &resolved.route, &self.routes);
            let position = self.routes.len() - 1;
            self.insert_entry(position, resolved.route.with_cache_key(key));
        }
        debug_log!("set_backstack: {} entr(ies) below the top", self.routes.len() - 1);
        self.notify(true);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Override and overlay
    // ------------------------------------------------------------------------

    /// Show a full-screen page instead of the stack until removed.
    pub fn set_override(&mut self, name: &str) -> NavigationResult<()> {
        let (_, route) = self.resolve(name, &PushOptions::new())?;
        let key = format!("@override:{}", route.path());
        self.override_route = Some(route.with_cache_key(key));
        self.notify(true);
        Ok(())
    }

    pub fn remove_override(&mut self) -> bool {
        let Some(route) = self.override_route.take() else {
            return false;
        };
        self.pages.clear_cached_route(&route);
        self.notify(true);
        true
    }

    /// Show a page above the stack without hiding it.
    pub fn set_overlay(&mut self, name: &str) -> NavigationResult<()> {
        let (_, route) = self.resolve(name, &PushOptions::new())?;
        let key = format!("@overlay:{}", route.path());
        self.overlay_route = Some(route.with_cache_key(key));
        self.notify(true);
        Ok(())
    }

    pub fn remove_overlay(&mut self) -> bool {
        let Some(route) = self.overlay_route.take() else {
            return false;
        };
        self.pages.clear_cached_route(&route);
        self.notify(true);
        true
    }

    pub fn override_route(&self) -> Option<&Route> {
        self.override_route.as_ref()
    }

    pub fn overlay_route(&self) -> Option<&Route> {
        self.overlay_route.as_ref()
    }

    // ------------------------------------------------------------------------
    // Rendering and notifications
    // ------------------------------------------------------------------------

    /// Turn the stack (plus override or overlay) into pages.
    ///
    /// While an override is shown the stack's page shells stay cached, so
    /// its pages keep their keys once the override is removed.
    pub fn materialize(&mut self) -> Vec<Page> {
        if let Some(route) = &self.override_route {
            return self
                .pages
                .materialize_override(route, &self.routes, &self.registry);
        }
        match &self.overlay_route {
            Some(overlay) => self
                .pages
                .materialize_with_overlay(&self.routes, overlay, &self.registry),
            None => self.pages.materialize(&self.routes, &self.registry),
        }
    }

    /// Stream of visible-route changes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RouteChange> {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Register a callback run after every applied mutation.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&[Route]) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Hold back notifications until [`apply`](Self::apply).
    pub fn defer(&mut self) {
        self.deferred = true;
    }

    /// Flush exactly one notification for everything since the last one.
    pub fn apply(&mut self) {
        self.deferred = false;
        self.flush(true);
    }

    /// `true` while mutations are waiting for [`apply`](Self::apply).
    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    fn notify(&mut self, apply: bool) {
        if !apply || self.deferred {
            trace_log!("Notification deferred");
            self.dirty = true;
            return;
        }
        self.flush(false);
    }

    fn flush(&mut self, force: bool) {
        self.dirty = false;
        for listener in &self.listeners {
            listener(&self.routes);
        }

        let current = self.current().clone();
        let changed = self.last_notified.as_ref().map_or(true, |last| {
            last.cache_key() != current.cache_key() || !last.same_data(&current)
        });
        if !(changed || force) {
            return;
        }
        let change = RouteChange {
            previous: self.last_notified.replace(current.clone()),
            current,
        };
        trace_log!("Route changed to '{}'", change.current.location());
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(change.clone()).is_ok());
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn resolve(
        &self,
        name: &str,
        options: &PushOptions,
    ) -> NavigationResult<(Arc<RouteTemplate>, Route)> {
        let resolved = self
            .registry
            .resolve(name, &options.path_params, &options.query)?;
        let mut route = resolved
            .route
            .with_arguments(options.arguments.clone())
            .with_data(options.data.clone());
        if let Some(key) = &options.cache_key {
            route = route.with_cache_key(key.clone());
        }
        Ok((resolved.template, route))
    }

    /// Put `route` on the stack and return its index.
    fn place(&mut self, route: Route, template: Option<&RouteTemplate>, placement: Placement) -> usize {
        if let Some(index) = self.slot_for(&route, placement) {
            for above in (index + 1..self.routes.len()).rev() {
                self.remove_at(above, PushOutcome::Removed);
            }
            let existing = &self.routes[index];
            if let (Some(kept), Some(requested)) = (existing.cache_key(), route.cache_key()) {
                if kept != requested {
                    warn_log!(
                        "push: '{}' updated in place, keeping cache key '{}' over '{}'",
                        route.location(),
                        kept,
                        requested
                    );
                }
            }
            let key = existing
                .cache_key()
                .or(route.cache_key())
                .map(str::to_string);
            debug_log!(
                "push: '{}' updated in place at index {}",
                route.location(),
                index
            );
            self.routes[index] = match key {
                Some(key) => route.with_cache_key(key),
                None => route,
            };
            return index;
        }

        let key = resolve_cache_key(template, &route, &self.routes);
        debug_log!("push: '{}' appended with key '{}'", route.location(), key);
        self.push_entry(route.with_cache_key(key));
        self.routes.len() - 1
    }

    fn slot_for(&self, route: &Route, placement: Placement) -> Option<usize> {
        if placement == Placement::Duplicate {
            return None;
        }
        let top = self.routes.last()?;
        if top.path() == route.path() || top.same_group(route) {
            return Some(self.routes.len() - 1);
        }
        self.routes.iter().rposition(|entry| {
            entry.same_slot(route)
                && (placement == Placement::Collapse
                    || entry.same_data(route)
                    || entry.same_group(route))
        })
    }

    fn push_entry(&mut self, route: Route) {
        let index = self.routes.len();
        self.insert_entry(index, route);
    }

    fn insert_entry(&mut self, index: usize, route: Route) {
        self.routes.insert(index, route);
        self.entries.insert(index, self.next_entry);
        self.next_entry += 1;
    }

    fn register_pending(&mut self, index: usize) -> PushFuture {
        let (sender, receiver) = oneshot::channel();
        self.pending
            .entry(self.entries[index])
            .or_default()
            .push(sender);
        PushFuture { receiver }
    }

    /// Remove the entry and settle its pending futures. Its page shell is
    /// evicted once no remaining entry uses the cache key.
    fn remove_at(&mut self, index: usize, outcome: PushOutcome) -> Route {
        let id = self.entries.remove(index);
        let removed = self.routes.remove(index);
        if let Some(senders) = self.pending.remove(&id) {
            for sender in senders {
                let _ = sender.send(outcome.clone());
            }
        }
        let shared = removed.cache_key().is_some_and(|key| {
            self.routes
                .iter()
                .any(|route| route.cache_key() == Some(key))
        });
        if !shared {
            self.pages.clear_cached_route(&removed);
        }
        removed
    }

    fn release_all(&mut self) {
        for (_, senders) in self.pending.drain() {
            for sender in senders {
                let _ = sender.send(PushOutcome::Removed);
            }
        }
    }

    fn index_of_key(&self, key: &str) -> Option<usize> {
        self.routes
            .iter()
            .rposition(|route| route.cache_key() == Some(key))
    }

    fn index_of(&self, route: &Route) -> NavigationResult<usize> {
        let found = match route.cache_key() {
            Some(key) => self.index_of_key(key),
            None => self.routes.iter().rposition(|entry| entry == route),
        };
        found.ok_or_else(|| NavigationError::RouteNotFound {
            name: route.location(),
        })
    }
}

fn resolve_or_unknown(
    registry: &RouteRegistry,
    location: &str,
) -> (Option<Arc<RouteTemplate>>, Route) {
    match registry.resolve_location(location) {
        Ok(resolved) => (Some(resolved.template), resolved.route),
        Err(err) => {
            warn_log!("{}; keeping it as an unknown route", err);
            (None, Route::from_location(location))
        }
    }
}

impl std::fmt::Debug for NavigationStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStack")
            .field("routes", &self.routes)
            .field("pages", &self.pages)
            .field("override_route", &self.override_route)
            .field("overlay_route", &self.overlay_route)
            .field("can_pop", &self.can_pop)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
