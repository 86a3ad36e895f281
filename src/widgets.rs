//! Page-stack rendering.
//!
//! - [`PageStackView`] / [`page_stack`] — materializes the global stack and
//!   renders its pages on top of each other. Place this once in your
//!   top-level layout.
//! - [`not_found_page`] — the built-in page for stack entries that have no
//!   template and no not-found handler.
//!
//! Pages are drawn from the topmost opaque page upward; anything below it is
//! fully covered and skipped. Each page is wrapped in an element whose id is
//! the page key, so GPUI keeps element state for as long as the page shell
//! lives in the cache.

use crate::context::{GlobalNavigator, UseNavigator};
use crate::pages::Page;
use crate::route::Route;
use crate::trace_log;
use gpui::*;

// ============================================================================
// PageStackView
// ============================================================================

/// Component that renders the global navigation stack.
pub struct PageStackView;

impl Default for PageStackView {
    fn default() -> Self {
        Self
    }
}

impl PageStackView {
    pub fn new() -> Self {
        Self
    }
}

impl Render for PageStackView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        page_stack(window, cx)
    }
}

/// Functional form of [`PageStackView`].
pub fn page_stack(window: &mut Window, cx: &mut App) -> AnyElement {
    if cx.try_global::<GlobalNavigator>().is_none() {
        return div().child("No navigator configured").into_any_element();
    }

    let pages = cx.update_navigator(|stack, _| stack.materialize());
    let first = first_visible(&pages);
    trace_log!(
        "page_stack: rendering {} of {} page(s)",
        pages.len() - first,
        pages.len()
    );

    let mut container = div().relative().size_full();
    for page in &pages[first..] {
        let content = page.render(window, cx);
        container = container.child(
            div()
                .id(ElementId::Name(page.key().to_string().into()))
                .absolute()
                .top_0()
                .left_0()
                .size_full()
                .child(content),
        );
    }
    container.into_any_element()
}

/// Index of the topmost opaque page; pages below it are hidden.
fn first_visible(pages: &[Page]) -> usize {
    pages
        .iter()
        .rposition(|page| page.shell().is_opaque())
        .unwrap_or(0)
}

// ============================================================================
// Built-in not-found page
// ============================================================================

/// Built-in minimalist 404 page.
pub fn not_found_page(route: &Route) -> AnyElement {
    div()
        .flex()
        .flex_col()
        .items_center()
        .justify_center()
        .size_full()
        .bg(rgb(0x1e1e1e))
        .p_8()
        .gap_6()
        .child(
            div()
                .text_3xl()
                .font_weight(FontWeight::BOLD)
                .text_color(rgb(0xffffff))
                .child("404 | Page Not Found"),
        )
        .child(
            div()
                .text_base()
                .text_color(rgb(0xcccccc))
                .child(format!("No route matches: {}", route.location())),
        )
        .into_any_element()
}
