//! GPUI integration.
//!
//! The application keeps one [`NavigationStack`] per running app inside a
//! GPUI `Global`:
//!
//! - [`GlobalNavigator`] — the global itself, owning the stack.
//! - [`init_navigator`] — registers templates and seeds the stack from the
//!   initial location.
//! - [`Navigator`] — static helpers (`Navigator::push`, `Navigator::pop`, …)
//!   that update the global through `cx` and refresh open windows.
//! - [`UseNavigator`] — direct access to the stack from `App`.
//!
//! # Initialization
//!
//! ```ignore
//! use gpui_route_stack::{init_navigator, RouteTemplate};
//!
//! init_navigator(cx, "/", |registry| {
//!     registry.add_route(RouteTemplate::new("/", |_, _cx, _route| {
//!         gpui::div().into_any_element()
//!     }));
//! });
//! ```

use crate::error::NavigationResult;
use crate::registry::RouteRegistry;
use crate::route::Route;
use crate::stack::{NavigationStack, PopOptions, PushFuture, PushOptions, RouteChange};
use crate::{debug_log, info_log};
use futures::channel::mpsc;
use gpui::{App, BorrowAppContext, Global};
use std::borrow::BorrowMut;
use std::sync::Arc;

// ============================================================================
// GlobalNavigator
// ============================================================================

/// App-wide navigation state.
#[derive(Debug)]
pub struct GlobalNavigator {
    stack: NavigationStack,
}

impl GlobalNavigator {
    pub fn new(registry: RouteRegistry, initial_location: &str) -> Self {
        Self {
            stack: NavigationStack::new(Arc::new(registry), initial_location),
        }
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut NavigationStack {
        &mut self.stack
    }
}

impl Global for GlobalNavigator {}

// ============================================================================
// UseNavigator trait
// ============================================================================

/// Access the global navigation stack from context.
pub trait UseNavigator {
    /// Get a reference to the stack.
    fn navigator(&self) -> &NavigationStack;

    /// Update the stack.
    fn update_navigator<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut NavigationStack, &mut App) -> R;
}

impl UseNavigator for App {
    fn navigator(&self) -> &NavigationStack {
        self.global::<GlobalNavigator>().stack()
    }

    fn update_navigator<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut NavigationStack, &mut App) -> R,
    {
        self.update_global::<GlobalNavigator, _>(|navigator, cx| f(navigator.stack_mut(), cx))
    }
}

// ============================================================================
// init_navigator
// ============================================================================

/// Register templates and install the global navigator.
///
/// `initial_location` is the location the platform started the app with;
/// an unknown location is kept and rendered by the not-found page.
pub fn init_navigator<F>(cx: &mut App, initial_location: &str, configure: F)
where
    F: FnOnce(&mut RouteRegistry),
{
    let mut registry = RouteRegistry::new();
    configure(&mut registry);
    info_log!(
        "Navigator initialized with {} template(s) at '{}'",
        registry.templates().len(),
        initial_location
    );
    cx.set_global(GlobalNavigator::new(registry, initial_location));
}

// ============================================================================
// Navigator
// ============================================================================

/// Static navigation API over the global stack.
///
/// Mutating calls refresh every window so the page stack re-renders.
///
/// # Example
///
/// ```ignore
/// use gpui_route_stack::Navigator;
///
/// let done = Navigator::push(cx, "/users/123")?;
/// Navigator::pop(cx);
/// ```
pub struct Navigator;

impl Navigator {
    fn update<R>(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        f: impl FnOnce(&mut NavigationStack) -> R,
    ) -> R {
        let result = cx.update_global::<GlobalNavigator, _>(|navigator, _| f(navigator.stack_mut()));
        let app: &mut App = cx.borrow_mut();
        app.refresh_windows();
        result
    }

    /// Push a route by label, pattern or location.
    pub fn push(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        name: &str,
    ) -> NavigationResult<PushFuture> {
        Self::push_with(cx, name, PushOptions::new())
    }

    /// Push with parameters, payloads or flags.
    pub fn push_with(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        name: &str,
        options: PushOptions,
    ) -> NavigationResult<PushFuture> {
        debug_log!("Navigator::push: '{}'", name);
        Self::update(cx, |stack| stack.push(name, options))
    }

    /// Pop the visible page. Returns `false` on the root.
    pub fn pop(cx: &mut (impl BorrowAppContext + BorrowMut<App>)) -> bool {
        Self::pop_with(cx, PopOptions::new())
    }

    pub fn pop_with(cx: &mut (impl BorrowAppContext + BorrowMut<App>), options: PopOptions) -> bool {
        Self::update(cx, |stack| stack.pop(options))
    }

    pub fn pop_until(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        name: &str,
        inclusive: bool,
    ) -> usize {
        Self::update(cx, |stack| stack.pop_until(name, inclusive))
    }

    /// Replace the visible page.
    pub fn replace(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        name: &str,
    ) -> NavigationResult<PushFuture> {
        Self::update(cx, |stack| stack.replace(name, PushOptions::new()))
    }

    /// Replace the whole stack.
    pub fn set(cx: &mut (impl BorrowAppContext + BorrowMut<App>), names: &[&str]) -> NavigationResult<()> {
        Self::update(cx, |stack| stack.set(names))
    }

    /// Follow a platform location (deep link).
    pub fn navigate_to_location(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
        location: &str,
    ) -> PushFuture {
        Self::update(cx, |stack| stack.navigate_to_location(location))
    }

    /// Subscribe to visible-route changes.
    pub fn subscribe(
        cx: &mut (impl BorrowAppContext + BorrowMut<App>),
    ) -> mpsc::UnboundedReceiver<RouteChange> {
        cx.update_global::<GlobalNavigator, _>(|navigator, _| navigator.stack_mut().subscribe())
    }

    /// Visible route.
    pub fn current(cx: &App) -> Route {
        cx.navigator().current().clone()
    }

    /// Visible location, e.g. `/product?id=1`.
    pub fn current_location(cx: &App) -> String {
        cx.navigator().current().location()
    }

    /// Snapshot of the whole stack.
    pub fn routes(cx: &App) -> Vec<Route> {
        cx.navigator().routes().to_vec()
    }

    pub fn can_pop(cx: &App) -> bool {
        cx.navigator().can_pop()
    }
}
