//! The route-tree builder and its flatten operation.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use thiserror::Error;
use trellis_core::BoxHandler;
use trellis_middleware::Middleware;
use trellis_pattern::PatternDef;

/// Monotonic source of node identities. Ids are the stable handles the
/// flatten pass uses to detect revisited nodes.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Errors raised while flattening a route tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A node was reached twice during flattening. The attachment graph
    /// must be a strict tree; sharing a subtree (or mounting a node under
    /// itself) is a programming error.
    #[error("cycle detected while flattening the route tree: node {id} visited twice")]
    Cycle {
        /// Identity of the revisited node.
        id: u64,
    },
}

/// One concrete route produced by flattening: the router construction
/// input.
#[derive(Clone)]
pub struct RouteDef {
    /// The HTTP method this route answers.
    pub method: Method,
    /// The pattern exactly as registered at its own scope.
    pub pattern: PatternDef,
    /// The canonical handler.
    pub handler: BoxHandler,
    /// Resolved middleware, outermost first.
    pub middleware: Vec<Middleware>,
}

impl fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDef")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// A node in the route tree.
///
/// Builders are cheap handles onto a shared node, so a built subtree can
/// be mounted elsewhere; that sharing is also why flattening must check
/// for revisits instead of trusting ownership to rule cycles out.
#[derive(Clone)]
pub struct RouteBuilder {
    node: Arc<Mutex<Node>>,
}

struct Node {
    id: u64,
    specs: Vec<Spec>,
    middleware: Vec<Middleware>,
}

#[derive(Clone)]
enum Spec {
    Route {
        method: Method,
        pattern: PatternDef,
        handler: BoxHandler,
    },
    Child {
        /// Prefix recorded by [`RouteBuilder::route`] / mount. Carried
        /// for diagnostics; never composed into child patterns.
        prefix: String,
        /// Whether the child receives the ancestor middleware chain.
        inherit: bool,
        node: RouteBuilder,
    },
}

impl RouteBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Arc::new(Mutex::new(Node {
                id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
                specs: Vec::new(),
                middleware: Vec::new(),
            })),
        }
    }

    /// Registers a middleware on this scope.
    ///
    /// It applies to every route on this node and on inheriting children,
    /// including routes registered before this call - middleware lists
    /// are resolved at flatten time, not at registration time.
    pub fn use_middleware(&self, middleware: Middleware) {
        self.node.lock().middleware.push(middleware);
    }

    /// Registers a route for `method`.
    pub fn handle(&self, method: Method, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.node.lock().specs.push(Spec::Route {
            method,
            pattern: pattern.into(),
            handler,
        });
    }

    /// Registers a `DELETE` route.
    pub fn delete(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::DELETE, pattern, handler);
    }

    /// Registers a `GET` route.
    pub fn get(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::GET, pattern, handler);
    }

    /// Registers a `HEAD` route.
    pub fn head(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::HEAD, pattern, handler);
    }

    /// Registers an `OPTIONS` route.
    pub fn options(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::OPTIONS, pattern, handler);
    }

    /// Registers a `PATCH` route.
    pub fn patch(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::PATCH, pattern, handler);
    }

    /// Registers a `POST` route.
    pub fn post(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::POST, pattern, handler);
    }

    /// Registers a `PUT` route.
    pub fn put(&self, pattern: impl Into<PatternDef>, handler: BoxHandler) {
        self.handle(Method::PUT, pattern, handler);
    }

    /// Creates an inheriting child scope with no prefix.
    ///
    /// Middleware registered inside the child does not leak back into
    /// this scope, but the child's routes receive this scope's middleware
    /// when flattened.
    pub fn group(&self, f: impl FnOnce(&RouteBuilder)) {
        self.route("", f);
    }

    /// Creates an inheriting child scope with a recorded prefix.
    ///
    /// The prefix is carried on the child spec only; child patterns are
    /// emitted exactly as registered - the builder never re-parses or
    /// concatenates pattern strings across scopes.
    pub fn route(&self, prefix: impl Into<String>, f: impl FnOnce(&RouteBuilder)) {
        let child = RouteBuilder::new();
        f(&child);
        self.node.lock().specs.push(Spec::Child {
            prefix: prefix.into(),
            inherit: true,
            node: child,
        });
    }

    /// Attaches an already-built tree as a non-inheriting child.
    ///
    /// The mounted tree's own middleware still applies; the ancestor
    /// chain's middleware stops at the mount boundary.
    pub fn mount(&self, prefix: impl Into<String>, child: &RouteBuilder) {
        self.node.lock().specs.push(Spec::Child {
            prefix: prefix.into(),
            inherit: false,
            node: child.clone(),
        });
    }

    /// Flattens the tree into the ordered list of concrete route
    /// definitions.
    ///
    /// Routes appear in registration order, depth-first. Each route's
    /// middleware list is the inherited ancestor chain followed by its
    /// own node's middleware, so the earliest-registered middleware wraps
    /// outermost.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Cycle`] if any node is reached twice.
    pub fn route_defs(&self) -> Result<Vec<RouteDef>, BuildError> {
        let mut defs = Vec::new();
        let mut seen = HashSet::new();
        self.walk(&mut seen, &[], &mut defs)?;
        Ok(defs)
    }

    fn walk(
        &self,
        seen: &mut HashSet<u64>,
        inherited: &[Middleware],
        defs: &mut Vec<RouteDef>,
    ) -> Result<(), BuildError> {
        // Snapshot under the lock, recurse without it.
        let (id, own_middleware, specs) = {
            let node = self.node.lock();
            (node.id, node.middleware.clone(), node.specs.clone())
        };

        if !seen.insert(id) {
            return Err(BuildError::Cycle { id });
        }

        for spec in specs {
            match spec {
                Spec::Route {
                    method,
                    pattern,
                    handler,
                } => {
                    let mut middleware =
                        Vec::with_capacity(inherited.len() + own_middleware.len());
                    middleware.extend_from_slice(inherited);
                    middleware.extend(own_middleware.iter().cloned());

                    defs.push(RouteDef {
                        method,
                        pattern,
                        handler,
                        middleware,
                    });
                }
                Spec::Child {
                    prefix,
                    inherit,
                    node,
                } => {
                    tracing::debug!(prefix = %prefix, inherit, "flattening child scope");
                    let next: Vec<Middleware> = if inherit {
                        inherited
                            .iter()
                            .chain(own_middleware.iter())
                            .cloned()
                            .collect()
                    } else {
                        Vec::new()
                    };
                    node.walk(seen, &next, defs)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for RouteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.lock();
        f.debug_struct("RouteBuilder")
            .field("id", &node.id)
            .field("specs", &node.specs.len())
            .field("middleware", &node.middleware.len())
            .finish()
    }
}
