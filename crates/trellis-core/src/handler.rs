//! The canonical handler shape.
//!
//! All handler representations a host accepts are normalized to the
//! [`Handler`] trait before routing. The accepted set is closed: a
//! context-aware function ([`handler_fn`]) or a context-free function
//! ([`plain_fn`], lifted). Anything else simply has no constructor, so an
//! unrecognized handler shape is a compile error rather than a runtime
//! one.

use std::sync::Arc;

use crate::{Context, Request, ResponseSink};

/// A request handler in canonical form.
///
/// Handlers receive the request-scoped [`Context`] (carrying any URL
/// parameters bound by the matching pattern), the read-only request, and
/// the response sink. They return nothing; the response is whatever was
/// written to the sink.
pub trait Handler: Send + Sync {
    /// Handles one request.
    fn serve(&self, ctx: &Context, req: &Request, sink: &mut dyn ResponseSink);
}

/// A shared, type-erased [`Handler`].
pub type BoxHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, ctx: &Context, req: &Request, sink: &mut dyn ResponseSink) {
        (**self).serve(ctx, req, sink);
    }
}

/// A [`Handler`] built from a context-aware function.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F>
where
    F: Fn(&Context, &Request, &mut dyn ResponseSink) + Send + Sync,
{
    /// Wraps `f` as a handler.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Context, &Request, &mut dyn ResponseSink) + Send + Sync,
{
    fn serve(&self, ctx: &Context, req: &Request, sink: &mut dyn ResponseSink) {
        (self.f)(ctx, req, sink);
    }
}

/// A [`Handler`] built from a function that ignores the context.
///
/// This is the lifted form of the "plain" handler shape: the context is
/// dropped on the floor, which is exactly what a handler that never asked
/// for one wants.
pub struct PlainFn<F> {
    f: F,
}

impl<F> PlainFn<F>
where
    F: Fn(&Request, &mut dyn ResponseSink) + Send + Sync,
{
    /// Wraps `f` as a handler.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for PlainFn<F>
where
    F: Fn(&Request, &mut dyn ResponseSink) + Send + Sync,
{
    fn serve(&self, _ctx: &Context, req: &Request, sink: &mut dyn ResponseSink) {
        (self.f)(req, sink);
    }
}

/// Adapts a context-aware function into a [`BoxHandler`].
///
/// # Example
///
/// ```
/// use trellis_core::{handler_fn, Context, Request, Response, Handler};
///
/// let h = handler_fn(|ctx, _req, sink| {
///     let name = ctx.param("name").unwrap_or("stranger");
///     sink.write_body(format!("hello, {name}").as_bytes());
/// });
///
/// let mut res = Response::new();
/// h.serve(&Context::background(), &Request::get("/hello"), &mut res);
/// assert_eq!(res.body(), b"hello, stranger");
/// ```
pub fn handler_fn<F>(f: F) -> BoxHandler
where
    F: Fn(&Context, &Request, &mut dyn ResponseSink) + Send + Sync + 'static,
{
    Arc::new(HandlerFn::new(f))
}

/// Adapts a context-free function into a [`BoxHandler`].
pub fn plain_fn<F>(f: F) -> BoxHandler
where
    F: Fn(&Request, &mut dyn ResponseSink) + Send + Sync + 'static,
{
    Arc::new(PlainFn::new(f))
}
