//! Cache-key resolution.
//!
//! Every stack entry is tagged with a cache key that decides which page
//! shell it renders into. The key is picked by the first matching rule:
//!
//! 1. the route already carries a key → keep it (idempotent);
//! 2. the template (or route) has a group → the group name;
//! 3. otherwise the canonical path, never the query;
//! 4. if another stack entry already owns that path key, the lowest free
//!    indexed key `path-2`, `path-3`, ...
//!
//! Rule 4 reuses indices: with `[x, x-2, x-3]` on the stack, removing `x-2`
//! and resolving another `x` yields `x-2` again.
//!
//! Explicit keys supplied by the caller are never indexed, even when they
//! collide; keeping them unique is the caller's job.
//!
//! ```
//! use gpui_route_stack::cache_key::resolve_cache_key;
//! use gpui_route_stack::Route;
//!
//! let stack = vec![Route::new("/x").with_cache_key("x")];
//! assert_eq!(resolve_cache_key(None, &Route::new("/x"), &stack), "x-2");
//! ```

use crate::route::{Route, RouteTemplate};
use crate::trace_log;

/// First index used for duplicate keys.
pub const FIRST_DUPLICATE_INDEX: usize = 2;

/// Resolve the cache key for `route` against the current stack snapshot.
///
/// `template` is the template the route resolved to, if any. The result is a
/// pure function of the inputs.
pub fn resolve_cache_key(template: Option<&RouteTemplate>, route: &Route, stack: &[Route]) -> String {
    if let Some(key) = route.cache_key() {
        return key.to_string();
    }

    let group = template
        .and_then(RouteTemplate::group_name)
        .or_else(|| route.group());
    if let Some(group) = group {
        trace_log!("Cache key '{}' (group) for '{}'", group, route.path());
        return group.to_string();
    }

    let base = route.path();
    let occupied = |key: &str| stack.iter().any(|entry| entry.cache_key() == Some(key));
    if !occupied(base) {
        trace_log!("Cache key '{}' (path)", base);
        return base.to_string();
    }

    let key = (FIRST_DUPLICATE_INDEX..)
        .map(|index| indexed_key(base, index))
        .find(|candidate| !occupied(candidate))
        .unwrap_or_else(|| base.to_string());
    trace_log!("Cache key '{}' (duplicate of '{}')", key, base);
    key
}

/// Build the indexed key for the `index`-th duplicate of `base`.
pub fn indexed_key(base: &str, index: usize) -> String {
    format!("{}-{}", base, index)
}
