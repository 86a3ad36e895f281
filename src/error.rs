//! Error handling for the route stack.
//!
//! Only a handful of conditions are real errors in this crate:
//!
//! - [`NavigationError::RouteNotFound`] — a name that matches no registered
//!   template. Callers are expected to validate names up front.
//! - [`NavigationError::EmptyStack`] — an operation that would leave the
//!   stack without a single route. This is a programmer error.
//! - [`NavigationError::InvalidTemplate`] — a template url without a leading `/`.
//! - [`NavigationError::MissingPathParameter`] — a `:param` placeholder with
//!   no value supplied.
//!
//! Everything else is either a silent no-op (popping the last page) or a
//! recovery path (an unresolved stack entry rendered by the
//! [`NotFoundHandler`]).
//!
//! # Examples
//!
//! ```
//! use gpui_route_stack::NavigationError;
//!
//! let err = NavigationError::RouteNotFound { name: "settings".into() };
//! assert_eq!(err.to_string(), "Route not found: settings");
//! assert!(err.is_not_found());
//! ```

use crate::route::Route;
use gpui::{AnyElement, App, Window};
use std::fmt;
use std::sync::Arc;

/// Result alias used by every fallible stack and registry operation.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Errors raised synchronously by the resolver and the stack manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No template is registered for the requested label or path.
    RouteNotFound {
        /// The name exactly as the caller passed it.
        name: String,
    },

    /// The operation would leave the stack empty.
    EmptyStack,

    /// A template url does not start with `/`.
    InvalidTemplate {
        /// The offending url.
        url: String,
    },

    /// A `:param` segment in the template has no value.
    MissingPathParameter {
        /// Template url being filled.
        name: String,
        /// Name of the missing parameter.
        parameter: String,
    },
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::RouteNotFound { name } => {
                write!(f, "Route not found: {}", name)
            }
            NavigationError::EmptyStack => {
                write!(f, "Route stack cannot be empty")
            }
            NavigationError::InvalidTemplate { url } => {
                write!(f, "Route template url must start with '/': {}", url)
            }
            NavigationError::MissingPathParameter { name, parameter } => {
                write!(f, "Missing path parameter '{}' for {}", parameter, name)
            }
        }
    }
}

impl std::error::Error for NavigationError {}

impl NavigationError {
    /// Check if this is a [`RouteNotFound`](Self::RouteNotFound) error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationError::RouteNotFound { .. })
    }

    /// Check if this is an [`EmptyStack`](Self::EmptyStack) error.
    pub fn is_empty_stack(&self) -> bool {
        matches!(self, NavigationError::EmptyStack)
    }
}

// ============================================================================
// Not-found fallback
// ============================================================================

/// Fallback page factory for stack entries without a matching template.
///
/// Receives the unresolved route so it can show the requested path.
pub type NotFoundHandler = Arc<dyn Fn(&mut Window, &mut App, &Route) -> AnyElement + Send + Sync>;
