//! Integration tests for the route-stack manager: cache-key assignment,
//! history collapse, completion futures and notifications.

mod common;

use common::*;
use futures::{FutureExt, StreamExt};
use gpui_route_stack::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn stack_at(location: &str) -> NavigationStack {
    NavigationStack::new(Arc::new(app_registry()), location)
}

// ---- cache keys ----

#[test]
fn test_group_members_collapse_to_one_entry() {
    let mut stack = app_stack();
    assert_keys(&stack, &["home"]);

    push(&mut stack, "/games");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.current().path(), "games");
    assert_keys(&stack, &["home"]);
}

#[test]
fn test_query_change_updates_in_place() {
    let mut stack = stack_at("/product?id=1");
    push(&mut stack, "/product?id=2");

    assert_eq!(stack.len(), 1);
    assert_keys(&stack, &["product"]);
    assert_eq!(stack.current().query().get("id"), Some("2"));
}

#[test]
fn test_same_path_after_other_route_gets_indexed_key() {
    let mut stack = stack_at("/product?id=1");
    push(&mut stack, "/other");
    push(&mut stack, "/product?id=2");

    assert_eq!(stack.len(), 3);
    assert_keys(&stack, &["product", "other", "product-2"]);
}

#[test]
fn test_duplicates_are_indexed_in_order() {
    let mut stack = plain_stack();
    for _ in 0..3 {
        let _ = stack
            .push("/x", PushOptions::new().allow_duplicates(true))
            .unwrap();
    }
    assert_keys(&stack, &["/", "x", "x-2", "x-3"]);
}

#[test]
fn test_removed_duplicate_index_is_reused() {
    let mut stack = plain_stack();
    for _ in 0..3 {
        let _ = stack
            .push("/x", PushOptions::new().allow_duplicates(true))
            .unwrap();
    }
    let second = stack.routes()[2].clone();
    stack.remove_route(&second).unwrap();
    assert_keys(&stack, &["/", "x", "x-3"]);

    let _ = stack
        .push("/x", PushOptions::new().allow_duplicates(true))
        .unwrap();
    assert_keys(&stack, &["/", "x", "x-3", "x-2"]);
}

#[test]
fn test_explicit_cache_key_is_kept() {
    let mut stack = plain_stack();
    let _ = stack
        .push("/other", PushOptions::new().cache_key("custom"))
        .unwrap();
    assert_keys(&stack, &["/", "custom"]);

    push(&mut stack, "/other?tab=1");
    assert_keys(&stack, &["/", "custom"]);
}

#[test]
fn test_set_rebuilds_keys_from_scratch() {
    let mut stack = plain_stack();
    push(&mut stack, "/x");
    stack
        .set_routes(vec![
            Route::new("/x").with_cache_key("stale"),
            Route::new("/x"),
            Route::new("/product"),
        ])
        .unwrap();
    assert_keys(&stack, &["x", "x-2", "product"]);
}

#[test]
fn test_set_routes_takes_group_and_label_from_templates() {
    let mut stack = app_stack();
    stack
        .set_routes(vec![
            Route::new("/"),
            Route::new("/product"),
            Route::new("/games"),
        ])
        .unwrap();

    assert_keys(&stack, &["home", "product", "home"]);
    let groups: Vec<Option<&str>> = stack.routes().iter().map(Route::group).collect();
    assert_eq!(groups, vec![Some("home"), None, Some("home")]);
    assert_eq!(stack.routes()[1].label(), "product");

    assert_eq!(stack.remove_group("home").unwrap(), 2);
    assert_keys(&stack, &["product"]);
}

#[test]
fn test_in_place_update_keeps_existing_cache_key() {
    let mut stack = plain_stack();
    let _ = stack
        .push("/other", PushOptions::new().cache_key("custom"))
        .unwrap();
    let _ = stack
        .push("/other?tab=2", PushOptions::new().cache_key("renamed"))
        .unwrap();

    assert_keys(&stack, &["/", "custom"]);
    assert_eq!(stack.current().query().get("tab"), Some("2"));
}

// ---- history collapse ----

#[test]
fn test_push_existing_route_truncates_above_it() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    push(&mut stack, "/other");
    push(&mut stack, "/x");

    push(&mut stack, "/product");
    assert_keys(&stack, &["/", "product"]);
}

#[test]
fn test_collapse_drops_futures_above() {
    let mut stack = plain_stack();
    push(&mut stack, "/product");
    let other = stack.push("/other", PushOptions::new()).unwrap();

    push(&mut stack, "/product");
    assert!(pollster::block_on(other).is_removed());
}

#[test]
fn test_grouped_route_collapses_from_deep_in_the_stack() {
    let mut stack = app_stack();
    push(&mut stack, "/product");
    push(&mut stack, "/settings");

    push(&mut stack, "/games");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.current().path(), "games");
}

#[test]
fn test_navigate_to_location_collapses_with_new_query() {
    let mut stack = stack_at("/product?id=1");
    push(&mut stack, "/other");

    let _ = stack.navigate_to_location("/product?id=9");
    assert_keys(&stack, &["product"]);
    assert_eq!(stack.current().query().get("id"), Some("9"));
}

#[test]
fn test_navigate_to_unknown_location_falls_back() {
    let mut stack = app_stack();
    let _ = stack.navigate_to_location("/nowhere?ref=mail");

    assert_eq!(stack.current().path(), "nowhere");
    let pages = stack.materialize();
    assert!(pages.last().unwrap().template().is_none());
}

// ---- non-emptiness ----

#[test]
fn test_stack_never_empties() {
    let mut stack = app_stack();
    assert!(!stack.pop(PopOptions::new()));
    assert!(!stack.pop(PopOptions::new().all(true)));

    let root = stack.current().clone();
    assert_eq!(stack.remove_route(&root), Err(NavigationError::EmptyStack));
    assert_eq!(stack.set(&[]), Err(NavigationError::EmptyStack));
    assert_eq!(stack.set_routes(Vec::new()), Err(NavigationError::EmptyStack));
    assert_eq!(stack.remove_group("home"), Err(NavigationError::EmptyStack));
    assert_eq!(stack.len(), 1);
}

#[test]
fn test_remove_group_keeps_others() {
    let mut stack = app_stack();
    push(&mut stack, "/product");
    assert_eq!(stack.remove_group("home").unwrap(), 1);
    assert_keys(&stack, &["product"]);
}

#[test]
fn test_failed_set_leaves_stack_untouched() {
    let mut stack = app_stack();
    push(&mut stack, "/product");

    let err = stack.set(&["/", "/missing"]).unwrap_err();
    assert!(err.is_not_found());
    assert_keys(&stack, &["home", "product"]);
}

// ---- resolution errors ----

#[test]
fn test_push_unknown_label() {
    let mut stack = app_stack();
    let err = stack.push("nope", PushOptions::new()).unwrap_err();
    assert_eq!(
        err,
        NavigationError::RouteNotFound {
            name: "nope".to_string()
        }
    );
}

#[test]
fn test_push_label_with_path_params() {
    let mut stack = app_stack();
    assert!(matches!(
        stack.push("user", PushOptions::new()),
        Err(NavigationError::MissingPathParameter { .. })
    ));

    let _ = stack
        .push("user", PushOptions::new().path_param("id", "7"))
        .unwrap();
    assert_eq!(stack.current().path(), "users/7");
    assert_eq!(stack.current().path_params().get("id"), Some("7"));
}

#[test]
fn test_arguments_and_data_reach_the_route() {
    let mut stack = app_stack();
    let _ = stack
        .push(
            "settings",
            PushOptions::new().arguments(42_u32).data("draft".to_string()),
        )
        .unwrap();
    assert_eq!(stack.current().arguments_as::<u32>(), Some(&42));
    assert_eq!(
        stack.current().data_as::<String>().map(String::as_str),
        Some("draft")
    );
}

// ---- completion futures ----

#[test]
fn test_pop_completes_future_with_result() {
    let mut stack = app_stack();
    let future = stack.push("settings", PushOptions::new()).unwrap();
    assert!(stack.pop(PopOptions::new().result("saved")));

    let outcome = pollster::block_on(future);
    assert_eq!(outcome.result_as::<&str>(), Some(&"saved"));
}

#[test]
fn test_in_place_update_future_completes_on_pop() {
    let mut stack = app_stack();
    let first = stack.push("/product?id=1", PushOptions::new()).unwrap();
    let second = stack.push("/product?id=2", PushOptions::new()).unwrap();
    stack.pop(PopOptions::new());

    assert!(matches!(pollster::block_on(first), PushOutcome::Popped(None)));
    assert!(matches!(pollster::block_on(second), PushOutcome::Popped(None)));
}

#[test]
fn test_future_pending_until_pop() {
    let mut stack = app_stack();
    let mut future = stack.push("settings", PushOptions::new()).unwrap();
    assert!((&mut future).now_or_never().is_none());

    stack.pop(PopOptions::new());
    assert!(future.now_or_never().is_some());
}

#[test]
fn test_removal_resolves_future_as_removed() {
    let mut stack = app_stack();
    let removed = stack.push("settings", PushOptions::new()).unwrap();
    let replaced = stack.push("/other", PushOptions::new()).unwrap();

    let settings = stack.routes()[1].clone();
    stack.remove_route(&settings).unwrap();
    let _ = stack.replace("/x", PushOptions::new()).unwrap();

    assert!(pollster::block_on(removed).is_removed());
    assert!(pollster::block_on(replaced).is_removed());
}

#[test]
fn test_pop_until_completes_every_popped_future() {
    let mut stack = app_stack();
    let a = stack.push("/product", PushOptions::new()).unwrap();
    let b = stack.push("/other", PushOptions::new()).unwrap();

    assert_eq!(stack.pop_until_where(|route| route.group() == Some("home"), false), 2);
    assert!(matches!(pollster::block_on(a), PushOutcome::Popped(None)));
    assert!(matches!(pollster::block_on(b), PushOutcome::Popped(None)));
}

#[test]
fn test_entries_sharing_a_key_complete_separately() {
    let mut stack = app_stack();
    let mut games = stack
        .push("/games", PushOptions::new().allow_duplicates(true))
        .unwrap();
    let home = stack
        .push("/", PushOptions::new().allow_duplicates(true))
        .unwrap();
    assert_keys(&stack, &["home", "home", "home"]);
    stack.materialize();

    assert!(stack.pop(PopOptions::new().result(1_u8)));
    assert_eq!(pollster::block_on(home).result_as::<u8>(), Some(&1));

    assert!((&mut games).now_or_never().is_none());
    assert!(stack.pages().contains("home"));

    assert!(stack.pop(PopOptions::new()));
    assert!(matches!(pollster::block_on(games), PushOutcome::Popped(None)));
}

// ---- notifications ----

#[test]
fn test_subscriber_sees_each_visible_change() {
    let mut stack = app_stack();
    let mut changes = stack.subscribe();

    push(&mut stack, "/product");
    push(&mut stack, "/other");
    stack.pop(PopOptions::new());

    let visited: Vec<String> = (0..3)
        .map(|_| changes.next().now_or_never().flatten().unwrap().current.location())
        .collect();
    assert_eq!(visited, vec!["/product", "/other", "/product"]);
    assert!(changes.next().now_or_never().is_none());
}

#[test]
fn test_deferred_operations_notify_once_on_apply() {
    let mut stack = app_stack();
    let mut changes = stack.subscribe();

    stack.set_backstack(&["/product"]).unwrap();
    assert_keys(&stack, &["product", "home"]);
    assert!(changes.next().now_or_never().is_none());

    stack.defer();
    push(&mut stack, "/settings");
    push(&mut stack, "/other");
    assert!(stack.has_pending_changes());
    assert!(changes.next().now_or_never().is_none());

    stack.apply();
    assert!(!stack.has_pending_changes());
    let change = changes.next().now_or_never().flatten().unwrap();
    assert_eq!(change.current.path(), "other");
    assert!(changes.next().now_or_never().is_none());
}

#[test]
fn test_apply_flag_defers_single_push() {
    let mut stack = app_stack();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    stack.add_listener(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let _ = stack
        .push("/product", PushOptions::new().apply(false))
        .unwrap();
    stack.pop(PopOptions::new().apply(false));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    stack.apply();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
