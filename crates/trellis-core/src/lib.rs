//! Core types for the Trellis routing and dispatch core.
//!
//! This crate defines the boundary vocabulary the rest of the workspace is
//! built from:
//!
//! - [`Context`] - an immutable, copy-on-write overlay carrying variables
//!   bound by a pattern match through a middleware chain to the handler.
//! - [`UrlParams`] - the bound (name, value) pairs themselves.
//! - [`Request`] / [`ResponseSink`] - the abstract, transport-agnostic
//!   request and response boundary. The core never sees a wire protocol;
//!   it only needs a method, a path, and somewhere to write a response.
//! - [`Handler`] - the canonical shape every request handler is normalized
//!   to before routing.
//!
//! Everything here is deliberately small: the interesting machinery lives
//! in `trellis-pattern`, `trellis-middleware`, and `trellis-router`.

mod context;
mod handler;
mod params;
mod request;
mod response;

pub use context::Context;
pub use handler::{handler_fn, plain_fn, BoxHandler, Handler, HandlerFn, PlainFn};
pub use params::{UrlParams, WILDCARD};
pub use request::Request;
pub use response::{write_not_found, Response, ResponseSink};
