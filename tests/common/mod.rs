//! Shared fixtures for the integration tests.
//!
//! Provides a page builder, registry factories and small assertion helpers.

#![allow(dead_code)]

use gpui::*;
use gpui_route_stack::*;
use std::sync::Arc;

/// Route log output to the test harness. Set `RUST_LOG=gpui_route_stack=trace`
/// to see stack mutations and cache decisions.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Page builder used by every test template.
pub fn test_page(_window: &mut Window, _cx: &mut App, _route: &Route) -> AnyElement {
    div().child("Test Page").into_any_element()
}

/// Create a template with the test page builder.
pub fn template(url: &str) -> RouteTemplate {
    RouteTemplate::new(url, test_page)
}

/// Registry with the routes most tests need.
///
/// | url            | label     | group  |
/// |----------------|-----------|--------|
/// | `/`            |           | `home` |
/// | `/games`       |           | `home` |
/// | `/product`     | `product` |        |
/// | `/other`       |           |        |
/// | `/x`           |           |        |
/// | `/users/:id`   | `user`    |        |
/// | `/settings`    | `settings`|        |
pub fn app_registry() -> RouteRegistry {
    RouteRegistry::new()
        .with_route(template("/").group("home"))
        .with_route(template("/games").group("home"))
        .with_route(template("/product").label("product"))
        .with_route(template("/other"))
        .with_route(template("/x"))
        .with_route(template("/users/:id").label("user"))
        .with_route(template("/settings").label("settings"))
}

/// Stack over [`app_registry`] seeded at `/`.
pub fn app_stack() -> NavigationStack {
    init_logging();
    NavigationStack::new(Arc::new(app_registry()), "/")
}

/// Stack over a registry with a single non-grouped root, seeded at `/`.
pub fn plain_stack() -> NavigationStack {
    init_logging();
    let registry = RouteRegistry::new()
        .with_route(template("/"))
        .with_route(template("/product"))
        .with_route(template("/other"))
        .with_route(template("/x"));
    NavigationStack::new(Arc::new(registry), "/")
}

/// Push and discard the completion future.
pub fn push(stack: &mut NavigationStack, name: &str) {
    let _ = stack
        .push(name, PushOptions::new())
        .unwrap_or_else(|err| panic!("push '{}' failed: {}", name, err));
}

/// Cache keys of the stack, root first.
pub fn cache_keys(stack: &NavigationStack) -> Vec<String> {
    stack
        .routes()
        .iter()
        .map(|route| route.cache_key().unwrap_or_default().to_string())
        .collect()
}

/// Assert the stack's cache keys, root first.
pub fn assert_keys(stack: &NavigationStack, expected: &[&str]) {
    let actual = cache_keys(stack);
    assert_eq!(
        actual, expected,
        "cache keys differ: got {:?}, expected {:?}",
        actual, expected
    );
}
