//! # Trellis
//!
//! **A transport-agnostic request-routing and dispatch core.**
//!
//! Trellis selects a matching route for an incoming request, binds path
//! variables into a request-scoped context, and invokes the route's
//! handler through an ordered chain of middleware:
//!
//! - **Patterns** - compact path templates (`/users/:id`, `/files/*`) and
//!   arbitrary left-anchored regular expressions behind one contract,
//!   with literal-prefix extraction for fast rejection.
//! - **Middleware stacks** - first-registered-outermost composition with
//!   a generational pool of pre-built chains, safe for concurrent use.
//! - **Route builder** - a tree of nested scopes with inherited or
//!   isolated middleware, flattened into an ordered route list.
//! - **Router** - first-match sequential dispatch over that list.
//!
//! ## Quick start
//!
//! ```
//! use trellis::prelude::*;
//!
//! let b = RouteBuilder::new();
//! b.get(
//!     "/hello/:name",
//!     handler_fn(|ctx, _req, sink| {
//!         let name = ctx.param("name").unwrap_or("stranger");
//!         sink.write_body(format!("hello, {name}").as_bytes());
//!     }),
//! );
//!
//! let router = Router::new(b.route_defs()?)?;
//!
//! let mut res = Response::new();
//! router.dispatch(&Request::get("/hello/world"), &mut res);
//! assert_eq!(res.body(), b"hello, world");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The transport is somebody else's job: hosts hand Trellis a method and
//! a path, give it a [`ResponseSink`](prelude::ResponseSink) to write
//! into, and mount [`Router::dispatch`](prelude::Router::dispatch)
//! wherever requests arrive.

// Re-export core types
pub use trellis_core as core;

// Re-export the pattern engine
pub use trellis_pattern as pattern;

// Re-export middleware types
pub use trellis_middleware as middleware;

// Re-export the route builder
pub use trellis_builder as builder;

// Re-export the router
pub use trellis_router as router;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use trellis_core::{
        handler_fn, plain_fn, BoxHandler, Context, Handler, Request, Response, ResponseSink,
        UrlParams,
    };

    pub use trellis_pattern::{Pattern, PatternDef, PatternError, RegexPattern, TemplatePattern};

    pub use trellis_middleware::{
        ChainHandler, ContextCell, Middleware, MiddlewareStack, RemovePolicy, StackError,
    };

    pub use trellis_builder::{BuildError, RouteBuilder, RouteDef};

    pub use trellis_router::{Router, RouterError};
}
