//! Logging abstraction layer.
//!
//! Every stack mutation, cache-key decision and page-cache generation swap is
//! reported through these macros. They dispatch to either the
//! [`log`](https://docs.rs/log) or [`tracing`](https://docs.rs/tracing) crate
//! depending on which feature is enabled. Enable at most one of the two
//! features.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! # Available macros
//!
//! - `trace_log!`: cache-key picks, memo lookups, page reuse.
//! - `debug_log!`: stack mutations.
//! - `info_log!`: template registration and startup.
//! - `warn_log!`: recoveries, e.g. an unknown route kept on the stack.
//! - `error_log!`: refused operations that would empty the stack.
//!
//! All macros accept `format!`-style arguments:
//!
//! ```ignore
//! use gpui_route_stack::{trace_log, debug_log, info_log, warn_log, error_log};
//!
//! trace_log!("Cache key '{}' resolved for '{}'", key, route.path());
//! debug_log!("push: '{}' appended (depth {})", path, depth);
//! info_log!("Registered template '{}'", url);
//! warn_log!("No template for '{}', using not-found page", path);
//! error_log!("set: refusing to leave the stack empty");
//! ```

/// Forward a message to the enabled backend at the given level.
///
/// `$level` is one of `trace`, `debug`, `info`, `warn`, `error`; both
/// `log` and `tracing` expose macros under those names.
#[doc(hidden)]
#[macro_export]
macro_rules! __stack_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::$level!($($arg)*);
        #[cfg(feature = "log")]
        ::log::$level!($($arg)*);
    };
}

/// Emit a **trace**-level log message (cache lookups, key resolution).
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => { $crate::__stack_log!(trace, $($arg)*) };
}

/// Emit a **debug**-level log message (stack mutations).
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => { $crate::__stack_log!(debug, $($arg)*) };
}

/// Emit an **info**-level log message (registration, initial location).
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => { $crate::__stack_log!(info, $($arg)*) };
}

/// Emit a **warn**-level log message (recoveries such as unknown routes).
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => { $crate::__stack_log!(warn, $($arg)*) };
}

/// Emit an **error**-level log message.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => { $crate::__stack_log!(error, $($arg)*) };
}
