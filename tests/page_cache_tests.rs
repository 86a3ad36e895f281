//! Integration tests for page materialization: shell reuse, eviction and
//! reconciliation keys across stack operations.

mod common;

use common::*;
use gpui_route_stack::*;
use std::sync::Arc;

fn page_keys(pages: &[Page]) -> Vec<PageKey> {
    pages.iter().map(|page| page.key().clone()).collect()
}

#[test]
fn test_query_update_keeps_page_identity() {
    let mut stack = NavigationStack::new(Arc::new(app_registry()), "/product?id=1");
    let before = stack.materialize();

    push(&mut stack, "/product?id=2");
    let after = stack.materialize();

    assert_eq!(page_keys(&before), page_keys(&after));
    assert_eq!(after[0].route().query().get("id"), Some("2"));
}

#[test]
fn test_duplicate_entries_render_as_distinct_pages() {
    let mut stack = NavigationStack::new(Arc::new(app_registry()), "/product?id=1");
    push(&mut stack, "/other");
    push(&mut stack, "/product?id=2");

    let pages = stack.materialize();
    assert_eq!(pages.len(), 3);
    assert_ne!(pages[0].key(), pages[2].key());
    assert_eq!(pages[2].shell().cache_key(), "product-2");
}

#[test]
fn test_pop_evicts_shell() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    stack.materialize();
    assert!(stack.pages().contains("product"));

    stack.pop(PopOptions::new());
    assert!(!stack.pages().contains("product"));
    assert!(stack.pages().contains("/"));
}

#[test]
fn test_repush_after_pop_builds_new_page() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    let first = stack.materialize();

    stack.pop(PopOptions::new());
    push(&mut stack, "/product");
    let second = stack.materialize();

    assert_eq!(first[0].key(), second[0].key());
    assert_ne!(first[1].key(), second[1].key());
}

#[test]
fn test_remove_evicts_only_removed_entry() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    push(&mut stack, "/other");
    let before = stack.materialize();

    let product = stack.routes()[1].clone();
    stack.remove_route(&product).unwrap();
    assert!(!stack.pages().contains("product"));

    let after = stack.materialize();
    assert_eq!(after.len(), 2);
    assert_eq!(before[2].key(), after[1].key());
}

#[test]
fn test_group_siblings_render_once() {
    let mut stack = app_stack();
    stack.set(&["/", "/games", "/product"]).unwrap();
    assert_keys(&stack, &["home", "home", "product"]);

    let pages = stack.materialize();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].route().path(), "games");
}

#[test]
fn test_set_clears_cache() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    let before = stack.materialize();

    stack.set(&["/", "/product"]).unwrap();
    assert!(stack.pages().is_empty());

    let after = stack.materialize();
    assert_ne!(page_keys(&before), page_keys(&after));
}

#[test]
fn test_reorder_keeps_page_identity() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    push(&mut stack, "/other");
    let before = stack.materialize();

    let product = stack.routes()[1].clone();
    stack.reorder_to_top(&product).unwrap();
    let after = stack.materialize();

    assert_eq!(before[1].key(), after[2].key());
    assert_eq!(before[2].key(), after[1].key());
}

#[test]
fn test_on_pop_page_with_result() {
    let mut stack = app_stack();
    let future = stack.push("settings", PushOptions::new()).unwrap();
    let pages = stack.materialize();

    let result: Payload = Arc::new(3_u8);
    assert!(stack.on_pop_page(pages[1].key(), Some(result)));

    let outcome = pollster::block_on(future);
    assert_eq!(outcome.result_as::<u8>(), Some(&3));
}

#[test]
fn test_on_pop_page_of_overlay_removes_overlay() {
    let mut stack = app_stack();
    stack.set_overlay("settings").unwrap();
    let pages = stack.materialize();
    assert_eq!(pages.len(), 2);

    assert!(stack.on_pop_page(pages[1].key(), None));
    assert!(stack.overlay_route().is_none());
    assert_eq!(stack.len(), 1);
}

#[test]
fn test_not_found_handler_is_attached() {
    let mut registry = app_registry();
    registry.on_not_found(test_page);
    let mut stack = NavigationStack::new(Arc::new(registry), "/missing");

    let pages = stack.materialize();
    assert!(pages[0].template().is_none());
    assert_eq!(pages[0].route().path(), "missing");
}

#[test]
fn test_pages_survive_override() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    let before = stack.materialize();

    stack.set_override("/other").unwrap();
    let pages = stack.materialize();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].route().path(), "other");

    assert!(stack.remove_override());
    let after = stack.materialize();
    assert_eq!(page_keys(&before), page_keys(&after));
}

#[test]
fn test_overlay_in_top_group_keeps_top_page() {
    let mut stack = app_stack();
    stack.set_overlay("/games").unwrap();

    let pages = stack.materialize();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].route().path(), "/");
    assert_eq!(pages[1].route().path(), "games");
}

#[test]
fn test_grouped_siblings_apart_keep_stable_pages() {
    let mut stack = app_stack();
    stack
        .set_routes(vec![
            Route::new("/"),
            Route::new("/product"),
            Route::new("/games"),
        ])
        .unwrap();

    let first = stack.materialize();
    let second = stack.materialize();
    assert_eq!(first.len(), 3);
    assert_eq!(page_keys(&first), page_keys(&second));
    assert_ne!(first[0].key(), first[2].key());
}
