//! First-match route dispatch for Trellis.
//!
//! The [`Router`] is the assembled, runtime half of the workspace: it
//! takes the flattened route list a
//! [`RouteBuilder`](trellis_builder::RouteBuilder) produced, parses every
//! pattern, wraps every handler in its own middleware stack, and then
//! dispatches requests - first matching route wins, in registration
//! order.
//!
//! # Example
//!
//! ```
//! use trellis_builder::RouteBuilder;
//! use trellis_core::{handler_fn, Request, Response};
//! use trellis_router::Router;
//!
//! let b = RouteBuilder::new();
//! b.get(
//!     "/hello/:name",
//!     handler_fn(|ctx, _req, sink| {
//!         sink.write_body(ctx.param("name").unwrap_or("?").as_bytes());
//!     }),
//! );
//!
//! let router = Router::new(b.route_defs().unwrap()).unwrap();
//!
//! let mut res = Response::new();
//! router.dispatch(&Request::get("/hello/world"), &mut res);
//! assert_eq!(res.body(), b"world");
//! ```

mod router;

pub use router::{Router, RouterError};
