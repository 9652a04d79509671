//! Middleware composition for Trellis.
//!
//! A [`Middleware`] is a wrapping function: it receives the inner handler
//! of a chain and returns a handler that runs around it. A
//! [`MiddlewareStack`] owns an ordered list of them plus a terminal
//! handler, composes the whole chain (first-registered outermost), and
//! keeps a pool of pre-built chains so composition is not repeated on
//! every request.
//!
//! The pool is generational: any structural change to the stack
//! ([`MiddlewareStack::push`] / [`MiddlewareStack::remove`]) swaps in a
//! fresh, empty pool. Chains already checked out keep working for the
//! request they serve, but on release they are discarded rather than
//! returned to a pool they were not built for.
//!
//! # Example
//!
//! ```
//! use trellis_core::{plain_fn, Request, Response};
//! use trellis_middleware::{ChainHandler, Middleware, MiddlewareStack};
//! use std::sync::Arc;
//!
//! let stack = MiddlewareStack::new(
//!     plain_fn(|_req, sink| sink.write_body(b"handler")),
//!     vec![Middleware::plain(|inner: ChainHandler| {
//!         let wrapped: ChainHandler = Arc::new(
//!             move |req: &Request, sink: &mut dyn trellis_core::ResponseSink| {
//!                 sink.write_body(b"before ");
//!                 inner(req, sink);
//!             },
//!         );
//!         wrapped
//!     })],
//! );
//!
//! let item = stack.get();
//! let mut res = Response::new();
//! item.serve(&Request::get("/"), &mut res);
//! stack.release(item);
//!
//! assert_eq!(res.body(), b"before handler");
//! ```

mod middleware;
mod stack;

pub use middleware::{ChainHandler, ContextCell, Middleware};
pub use stack::{MiddlewareStack, RemovePolicy, StackError, StackItem};
