//! The canonical middleware shape and the per-chain context slot.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{Context, Request, ResponseSink};

/// A link in a composed chain: the handler shape middleware wrap.
///
/// Chain links take no context parameter - the request's context travels
/// through the [`ContextCell`] each chain closure captured when the chain
/// was composed, and the terminal link reads it out for the final
/// handler.
pub type ChainHandler = Arc<dyn Fn(&Request, &mut dyn ResponseSink) + Send + Sync>;

/// The mutable context slot shared by one chain's closures.
///
/// Each pooled chain owns exactly one cell. The dispatcher writes the
/// matched pattern's bindings into it before invoking the chain, the
/// chain's closures may read or replace it, and
/// [`MiddlewareStack::release`](crate::MiddlewareStack::release) resets
/// it to the stack's base context. Because the cell belongs to a single
/// checked-out chain, concurrent requests never share one.
#[derive(Debug, Clone)]
pub struct ContextCell {
    inner: Arc<Mutex<Context>>,
}

impl ContextCell {
    /// Creates a cell holding `ctx`.
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ctx)),
        }
    }

    /// Returns the current context (cheap: contexts are `Arc`-backed).
    #[must_use]
    pub fn get(&self) -> Context {
        self.inner.lock().clone()
    }

    /// Replaces the current context.
    pub fn set(&self, ctx: Context) {
        *self.inner.lock() = ctx;
    }
}

/// A middleware in canonical form: a function from an inner handler to a
/// wrapping handler.
///
/// The accepted shapes are a closed set with one constructor each:
///
/// - [`Middleware::with_context`] - the canonical shape, receiving the
///   chain's [`ContextCell`] alongside the inner handler;
/// - [`Middleware::plain`] - a wrapper that never looks at the context,
///   lifted into the canonical shape automatically.
///
/// A `Middleware` value keeps its identity across clones
/// ([`Middleware::same`]), which is how
/// [`MiddlewareStack::remove`](crate::MiddlewareStack::remove) finds it.
#[derive(Clone)]
pub struct Middleware {
    kind: Kind,
}

#[derive(Clone)]
enum Kind {
    WithContext(Arc<dyn Fn(&ContextCell, ChainHandler) -> ChainHandler + Send + Sync>),
    Plain(Arc<dyn Fn(ChainHandler) -> ChainHandler + Send + Sync>),
}

impl Middleware {
    /// Creates a middleware from the canonical, context-aware shape.
    #[must_use]
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&ContextCell, ChainHandler) -> ChainHandler + Send + Sync + 'static,
    {
        Self {
            kind: Kind::WithContext(Arc::new(f)),
        }
    }

    /// Creates a middleware from a wrapper that needs no context access.
    #[must_use]
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(ChainHandler) -> ChainHandler + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Plain(Arc::new(f)),
        }
    }

    /// Applies this middleware around `inner` for a chain whose context
    /// lives in `cell`.
    pub(crate) fn apply(&self, cell: &ContextCell, inner: ChainHandler) -> ChainHandler {
        match &self.kind {
            Kind::WithContext(f) => f(cell, inner),
            Kind::Plain(f) => f(inner),
        }
    }

    /// Returns true if `self` and `other` are clones of the same
    /// registered middleware value.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (Kind::WithContext(a), Kind::WithContext(b)) => Arc::ptr_eq(a, b),
            (Kind::Plain(a), Kind::Plain(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::WithContext(_) => f.write_str("Middleware::WithContext(..)"),
            Kind::Plain(_) => f.write_str("Middleware::Plain(..)"),
        }
    }
}
