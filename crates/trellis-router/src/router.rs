//! Router construction and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use thiserror::Error;
use trellis_builder::RouteDef;
use trellis_core::{write_not_found, BoxHandler, Context, Handler, Request, ResponseSink};
use trellis_middleware::MiddlewareStack;
use trellis_pattern::{Pattern, PatternError};

/// Errors raised while constructing a [`Router`].
///
/// These indicate a bad route table and should abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A route's pattern failed to parse.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A route's parsed pattern together with its dedicated middleware stack.
struct Route {
    pattern: Arc<dyn Pattern>,
    stack: MiddlewareStack,
}

/// A sequential, first-match router.
///
/// Routes are grouped by method and tried in registration order; the
/// first whose pattern matches handles the request, and later routes are
/// never consulted. Everything is built once at construction and is
/// read-only afterwards, so a `Router` can be shared freely across
/// threads.
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    not_found: Option<BoxHandler>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("methods", &self.routes.len())
            .field("has_not_found", &self.not_found.is_some())
            .finish()
    }
}

impl Router {
    /// Builds a router from flattened route definitions.
    ///
    /// Each definition's pattern is parsed and its handler is wrapped,
    /// together with the resolved middleware list, in its own
    /// [`MiddlewareStack`].
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if any pattern is malformed; callers
    /// should treat that as fatal.
    pub fn new(defs: Vec<RouteDef>) -> Result<Self, RouterError> {
        let mut routes: HashMap<Method, Vec<Route>> = HashMap::new();

        for def in defs {
            let pattern = trellis_pattern::parse(def.pattern)?;
            let stack = MiddlewareStack::new(def.handler, def.middleware);
            routes
                .entry(def.method)
                .or_default()
                .push(Route { pattern, stack });
        }

        Ok(Self {
            routes,
            not_found: None,
        })
    }

    /// Sets the handler invoked when no route matches.
    ///
    /// It runs with a fresh background context; without one, the standard
    /// not-found response is written instead.
    #[must_use]
    pub fn with_not_found(mut self, handler: BoxHandler) -> Self {
        self.not_found = Some(handler);
        self
    }

    /// Returns the total number of routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Dispatches one request.
    ///
    /// The first matching route's chain is checked out of its stack, the
    /// pattern is re-run to bind variables into the chain's context, the
    /// chain is invoked and then released. An unmatched request is not an
    /// error: it goes to the configured not-found handler or the standard
    /// not-found response.
    pub fn dispatch(&self, req: &Request, sink: &mut dyn ResponseSink) {
        if let Some(routes) = self.routes.get(req.method()) {
            for route in routes {
                // A pattern's literal prefix is a true prefix of all its
                // matches, so this rejects without the full match test.
                if !req.path().starts_with(route.pattern.prefix()) {
                    continue;
                }
                if !route.pattern.matches(req) {
                    continue;
                }

                tracing::trace!(
                    method = %req.method(),
                    path = %req.path(),
                    pattern = ?route.pattern,
                    "route matched"
                );

                let item = route.stack.get();
                let bound = route.pattern.run(req, item.context().get());
                item.context().set(bound);
                item.serve(req, sink);
                route.stack.release(item);
                return;
            }
        }

        tracing::debug!(method = %req.method(), path = %req.path(), "no route matched");
        match &self.not_found {
            Some(handler) => handler.serve(&Context::background(), req, sink),
            None => write_not_found(sink),
        }
    }
}
