//! The concurrency-safe middleware stack and its chain pool.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use thiserror::Error;
use trellis_core::{BoxHandler, Context, Handler, Request, ResponseSink};

use crate::middleware::{ChainHandler, ContextCell, Middleware};

/// What [`MiddlewareStack::remove`] does when the middleware was never
/// pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovePolicy {
    /// Report [`StackError::NotFound`] to the caller.
    #[default]
    Report,
    /// Treat the removal as a no-op.
    Ignore,
}

/// Errors reported by [`MiddlewareStack`] operations.
///
/// These are runtime-recoverable: the stack is left fully consistent and
/// later dispatches are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The middleware handed to `remove` is not in the stack.
    #[error("middleware not found in stack")]
    NotFound,
}

/// An ordered middleware list composed around a terminal handler, with a
/// pool of pre-built chains.
///
/// The stack is safe for concurrent use: [`MiddlewareStack::get`] /
/// [`MiddlewareStack::release`] are the per-request hot path and only
/// synchronize on the pool's own idle list, while the rare structural
/// mutations ([`MiddlewareStack::push`] / [`MiddlewareStack::remove`])
/// serialize on a separate lock and swap in a fresh pool.
///
/// Composition order: the first-pushed middleware is the outermost
/// wrapper - it sees the request first and the response last.
pub struct MiddlewareStack {
    terminal: BoxHandler,
    base_context: Context,
    remove_policy: RemovePolicy,
    /// Registered middleware, in push order. Guards every structural
    /// read-modify-write together with the pool swap below.
    registered: Mutex<Vec<Middleware>>,
    /// Current pool generation. Swapped wholesale on every structural
    /// change, so pooled chains are always built from the current list.
    pool: ArcSwap<ChainPool>,
}

impl MiddlewareStack {
    /// Creates a stack around `terminal` with an initial middleware list.
    #[must_use]
    pub fn new(terminal: BoxHandler, middleware: Vec<Middleware>) -> Self {
        let base_context = Context::background();
        let pool = ArcSwap::from_pointee(ChainPool::new(
            middleware.clone(),
            terminal.clone(),
            base_context.clone(),
        ));

        Self {
            terminal,
            base_context,
            remove_policy: RemovePolicy::default(),
            registered: Mutex::new(middleware),
            pool,
        }
    }

    /// Sets the base context new and released chains start from.
    #[must_use]
    pub fn with_base_context(mut self, base_context: Context) -> Self {
        self.base_context = base_context;
        let registered = self.registered.lock().clone();
        self.refresh_pool(&registered);
        self
    }

    /// Sets the policy for removing middleware that was never pushed.
    #[must_use]
    pub fn with_remove_policy(mut self, policy: RemovePolicy) -> Self {
        self.remove_policy = policy;
        self
    }

    /// Appends a middleware, invalidating all pooled chains.
    pub fn push(&self, middleware: Middleware) {
        let mut registered = self.registered.lock();
        registered.push(middleware);
        self.refresh_pool(&registered);
    }

    /// Removes a previously pushed middleware, invalidating all pooled
    /// chains.
    ///
    /// The middleware is located by identity ([`Middleware::same`]), so
    /// pass a clone of the value that was pushed. If it is absent the
    /// stack is untouched and the configured [`RemovePolicy`] decides
    /// whether that is an error.
    pub fn remove(&self, middleware: &Middleware) -> Result<(), StackError> {
        let mut registered = self.registered.lock();
        let Some(idx) = registered.iter().position(|m| m.same(middleware)) else {
            return match self.remove_policy {
                RemovePolicy::Report => Err(StackError::NotFound),
                RemovePolicy::Ignore => Ok(()),
            };
        };

        registered.remove(idx);
        self.refresh_pool(&registered);
        Ok(())
    }

    /// Checks a composed chain out of the pool, building one if the pool
    /// is empty.
    #[must_use]
    pub fn get(&self) -> StackItem {
        let pool = self.pool.load_full();
        let idle = pool.idle.lock().pop();
        let chain = idle.unwrap_or_else(|| pool.compose());

        StackItem {
            chain,
            origin: pool,
        }
    }

    /// Returns a chain to the pool it was checked out from.
    ///
    /// The chain's context is reset to the base context first. If the
    /// stack was structurally mutated while the chain was out, its pool
    /// generation is gone and the chain is discarded instead of being
    /// handed to the new pool.
    pub fn release(&self, item: StackItem) {
        let StackItem { chain, origin } = item;
        chain.cell.set(self.base_context.clone());

        if Arc::ptr_eq(&origin, &self.pool.load_full()) {
            origin.idle.lock().push(chain);
        } else {
            tracing::trace!("discarding chain from a superseded pool generation");
        }
    }

    /// Swaps in a fresh, empty pool built from the given middleware list.
    ///
    /// Callers mutating the list must hold the `registered` lock across
    /// the mutation and this call so the list and the pool can never be
    /// observed out of step.
    fn refresh_pool(&self, registered: &[Middleware]) {
        self.pool.store(Arc::new(ChainPool::new(
            registered.to_vec(),
            self.terminal.clone(),
            self.base_context.clone(),
        )));
    }
}

/// One generation of pooled chains.
///
/// The pool carries the exact (middleware, terminal, base context)
/// snapshot its chains are composed from; a stale generation can
/// therefore never produce a chain reflecting the wrong list.
struct ChainPool {
    idle: Mutex<Vec<Chain>>,
    funcs: Vec<Middleware>,
    terminal: BoxHandler,
    base: Context,
}

impl ChainPool {
    fn new(funcs: Vec<Middleware>, terminal: BoxHandler, base: Context) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            funcs,
            terminal,
            base,
        }
    }

    /// Composes a fresh chain: the terminal closure reads the chain's
    /// context cell at call time, and middleware wrap it in reverse
    /// registration order so the first-pushed runs outermost.
    fn compose(&self) -> Chain {
        let cell = ContextCell::new(self.base.clone());

        let terminal = self.terminal.clone();
        let terminal_cell = cell.clone();
        let mut handler: ChainHandler =
            Arc::new(move |req: &Request, sink: &mut dyn ResponseSink| {
                let ctx = terminal_cell.get();
                terminal.serve(&ctx, req, sink);
            });

        for middleware in self.funcs.iter().rev() {
            handler = middleware.apply(&cell, handler);
        }

        Chain { cell, handler }
    }
}

/// A composed chain together with its context slot.
struct Chain {
    cell: ContextCell,
    handler: ChainHandler,
}

/// A chain checked out of a [`MiddlewareStack`] for one request.
pub struct StackItem {
    chain: Chain,
    origin: Arc<ChainPool>,
}

impl StackItem {
    /// Returns the chain's context slot.
    ///
    /// The dispatcher binds the matched pattern's variables here before
    /// invoking the chain.
    #[must_use]
    pub fn context(&self) -> &ContextCell {
        &self.chain.cell
    }

    /// Runs the composed chain for one request.
    pub fn serve(&self, req: &Request, sink: &mut dyn ResponseSink) {
        (self.chain.handler)(req, sink);
    }
}
