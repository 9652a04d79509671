//! The per-request context overlay.

use std::sync::Arc;

use crate::params::UrlParams;

/// An immutable key/value overlay carried through a request's middleware
/// chain to its handler.
///
/// A `Context` holds at most one entry: the URL parameters bound by the
/// pattern that matched the request. Binding never mutates an existing
/// context - [`Context::with_url_params`] produces a new value, so two
/// concurrent requests matching the same route can never observe each
/// other's bindings. Cloning is cheap (the parameter map is shared behind
/// an `Arc`).
///
/// # Lifecycle
///
/// A context is created at the start of dispatch (or inherited from a
/// caller-supplied base), extended exactly once by a successful pattern
/// run, and discarded when the request completes.
///
/// # Example
///
/// ```
/// use trellis_core::{Context, UrlParams};
///
/// let base = Context::background();
/// assert!(base.url_params().is_none());
///
/// let mut params = UrlParams::new();
/// params.push("name", "world");
/// let bound = base.with_url_params(params);
///
/// // The base is untouched; only the new overlay carries the binding.
/// assert!(base.url_params().is_none());
/// assert_eq!(bound.param("name"), Some("world"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    url_params: Option<Arc<UrlParams>>,
}

impl Context {
    /// Returns the empty root context.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a new context carrying `params`, leaving `self` untouched.
    #[must_use]
    pub fn with_url_params(&self, params: UrlParams) -> Self {
        Self {
            url_params: Some(Arc::new(params)),
        }
    }

    /// Returns the URL parameters bound into this context, if any.
    #[must_use]
    pub fn url_params(&self) -> Option<&UrlParams> {
        self.url_params.as_deref()
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.url_params.as_deref().and_then(|p| p.get(name))
    }
}
