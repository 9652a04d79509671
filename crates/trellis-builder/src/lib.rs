//! Declarative route-tree builder for Trellis.
//!
//! A [`RouteBuilder`] accumulates route specifications and per-scope
//! middleware in a tree of nested scopes, then flattens the tree into the
//! ordered list of concrete [`RouteDef`]s the router is constructed from.
//!
//! Scopes differ in how middleware flows across them:
//!
//! - [`RouteBuilder::group`] / [`RouteBuilder::route`] create children
//!   that *inherit* the ancestor chain's middleware (ancestor-first);
//! - [`RouteBuilder::mount`] attaches an existing tree without
//!   inheritance - the mounted tree keeps only its own middleware.
//!
//! # Example
//!
//! ```
//! use trellis_builder::RouteBuilder;
//! use trellis_core::plain_fn;
//!
//! let b = RouteBuilder::new();
//! b.get("/", plain_fn(|_req, sink| sink.write_body(b"home")));
//! b.group(|api| {
//!     api.get("/users/:id", plain_fn(|_req, _sink| {}));
//! });
//!
//! let defs = b.route_defs().unwrap();
//! assert_eq!(defs.len(), 2);
//! ```

mod builder;

pub use builder::{BuildError, RouteBuilder, RouteDef};
