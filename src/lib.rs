//! # gpui-route-stack
//!
//! Route stack manager and page cache for [GPUI](https://gpui.rs).
//!
//! The crate keeps an ordered stack of routes and turns it into a list of
//! pages on every render pass. For each stack entry it decides whether the
//! page shown before can be reused or a new one has to be built:
//!
//! - a query-only navigation updates the visible page in place;
//! - navigating to a route already deeper in the stack collapses history
//!   onto it;
//! - the same path pushed as a genuinely new entry gets an indexed cache key
//!   (`product`, `product-2`, …);
//! - routes sharing a group share one page.
//!
//! ## Quick start
//!
//! ```ignore
//! use gpui::*;
//! use gpui_route_stack::*;
//!
//! fn main() {
//!     Application::new().run(|cx: &mut App| {
//!         init_navigator(cx, "/", |registry| {
//!             registry.add_route(RouteTemplate::new("/", |_, _cx, _route| {
//!                 div().child("Home").into_any_element()
//!             }));
//!             registry.add_route(
//!                 RouteTemplate::new("/product", |_, _cx, route| {
//!                     let id = route.query().get("id").unwrap_or("?").to_string();
//!                     div().child(format!("Product {id}")).into_any_element()
//!                 })
//!                 .label("product"),
//!             );
//!         });
//!
//!         cx.open_window(WindowOptions::default(), |_, cx| cx.new(|_| PageStackView::new()))
//!             .unwrap();
//!     });
//! }
//! ```
//!
//! ## Features
//!
//! | Feature   | Default | Effect |
//! |-----------|---------|--------|
//! | `log`     | yes     | log through the `log` crate |
//! | `tracing` | no      | log through the `tracing` crate |
//! | `cache`   | yes     | LRU memo for route-name resolution |

#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(hidden)]
pub mod logging;

#[cfg(feature = "cache")]
pub mod cache;
pub mod cache_key;
pub mod context;
pub mod error;
pub mod matching;
pub mod pages;
pub mod params;
pub mod registry;
pub mod route;
pub mod stack;
pub mod widgets;

#[cfg(feature = "cache")]
pub use cache::{CacheStats, ResolveCache};
pub use cache_key::resolve_cache_key;
pub use context::{init_navigator, GlobalNavigator, Navigator, UseNavigator};
pub use error::{NavigationError, NavigationResult, NotFoundHandler};
pub use pages::{Page, PageCache, PageKey, PageShell};
pub use params::{QueryParams, RouteParams};
pub use registry::{ResolvedRoute, RouteRegistry};
pub use route::{PageBuilder, Payload, Route, RouteTemplate};
pub use stack::{
    NavigationStack, PopOptions, PushFuture, PushOptions, PushOutcome, RouteChange, StackListener,
};
pub use widgets::{not_found_page, page_stack, PageStackView};
