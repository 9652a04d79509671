//! Pattern-matching engine for Trellis.
//!
//! A [`Pattern`] decides whether a request path matches some criteria and,
//! on a match, binds named variables into the request's context. Routes
//! are essentially (method, pattern, handler) tuples; the router asks the
//! pattern three things:
//!
//! - [`Pattern::prefix`] - a literal string every matching path starts
//!   with, used to skip obviously ineligible routes cheaply. May be empty.
//! - [`Pattern::matches`] - the full match test. Pure and idempotent; it
//!   may run several times for one request and must never bind anything.
//! - [`Pattern::run`] - re-match and bind variables, copy-on-write, into
//!   the context.
//!
//! Two implementations are provided: [`TemplatePattern`] for the compact
//! `/users/:id`-style path syntax, and [`RegexPattern`] for arbitrary
//! left-anchored regular expressions. [`PatternDef`] is the closed set of
//! pattern values a route definition may carry; [`parse`] turns one into a
//! ready-to-match `Pattern`.

mod regex_pattern;
mod template;

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;
use trellis_core::{Context, Request};

pub use regex_pattern::RegexPattern;
pub use template::TemplatePattern;

/// A matcher for request paths that can also bind named variables.
pub trait Pattern: fmt::Debug + Send + Sync {
    /// Returns a literal string that every matching path starts with.
    ///
    /// This is an optimization hook only: the router may use it to skip
    /// the (likely more expensive) full match test, so it must be a true
    /// prefix of every match. Patterns that cannot prove a prefix return
    /// the empty string.
    fn prefix(&self) -> &str;

    /// Returns true if the request satisfies the pattern.
    ///
    /// Pure and idempotent: examines only the request and never binds
    /// variables.
    fn matches(&self, req: &Request) -> bool;

    /// Re-matches the request and binds any variables into `ctx`.
    ///
    /// Returns the extended context on a match with bindings; returns
    /// `ctx` unchanged on a non-match or when nothing was bound.
    fn run(&self, req: &Request, ctx: Context) -> Context;
}

/// The closed set of pattern values a route definition may carry.
///
/// This is the boundary shape handed to router construction: a path
/// template string, a compiled regular expression, or a caller-supplied
/// [`Pattern`] implementation. There is deliberately no open-ended
/// acceptance of other shapes.
#[derive(Debug, Clone)]
pub enum PatternDef {
    /// A path template, e.g. `/users/:id` or `/files/*`.
    Path(String),
    /// A regular expression, anchored on the left during parsing if it
    /// is not already.
    Regex(Regex),
    /// A pre-built pattern implementation.
    Custom(Arc<dyn Pattern>),
}

impl From<&str> for PatternDef {
    fn from(template: &str) -> Self {
        Self::Path(template.to_string())
    }
}

impl From<String> for PatternDef {
    fn from(template: String) -> Self {
        Self::Path(template)
    }
}

impl From<Regex> for PatternDef {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<Arc<dyn Pattern>> for PatternDef {
    fn from(pattern: Arc<dyn Pattern>) -> Self {
        Self::Custom(pattern)
    }
}

/// Errors raised while parsing a path template.
///
/// These indicate a programming error in a route table, so router
/// construction surfaces them synchronously and startup should abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A break character was followed by `:` with no variable name.
    #[error("template {template:?} has a variable with an empty name at byte {position}")]
    EmptyVariable {
        /// The offending template.
        template: String,
        /// Byte offset of the break character introducing the variable.
        position: usize,
    },

    /// The same variable name appears twice in one template.
    #[error("template {template:?} binds the variable {name:?} more than once")]
    DuplicateVariable {
        /// The offending template.
        template: String,
        /// The duplicated variable name.
        name: String,
    },
}

/// Turns a [`PatternDef`] into a ready-to-match [`Pattern`].
///
/// Template parsing can fail (see [`PatternError`]); regex construction
/// cannot - analysis failures degrade to a correct, unoptimized pattern.
pub fn parse(def: PatternDef) -> Result<Arc<dyn Pattern>, PatternError> {
    match def {
        PatternDef::Path(template) => Ok(Arc::new(TemplatePattern::parse(&template)?)),
        PatternDef::Regex(re) => Ok(Arc::new(RegexPattern::new(re))),
        PatternDef::Custom(pattern) => Ok(pattern),
    }
}
