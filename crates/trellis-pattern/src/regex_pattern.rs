//! Regular-expression patterns.
//!
//! Two things make this more than a thin wrapper around [`regex::Regex`]:
//!
//! 1. Patterns must be left-anchored. An expression that is not already
//!    anchored is recompiled as `\A(?:...)` - group-wrapped so alternations
//!    and capture indices survive the rewrite.
//! 2. The router wants a cheap literal prefix for fast rejection. The
//!    engine does not hand one out in the presence of anchors, so we walk
//!    the expression's HIR along its unique fixed-character path and
//!    collect what we can prove.
//!
//! Neither analysis is load-bearing: if the HIR cannot be obtained or the
//! anchored recompile fails, the pattern degrades to the original
//! expression with an empty prefix, still matching correctly, and a
//! warning is logged.

use std::fmt;

use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind, Look};
use trellis_core::{Context, Request, UrlParams};

use crate::Pattern;

/// A [`Pattern`] backed by a left-anchored regular expression.
///
/// Capture groups become bound variables: named groups under their
/// declared name, unnamed group `i` under the synthetic name `$i`. The
/// expression is only anchored on the left - `/hello` (anchored to
/// `\A(?:/hello)`) matches `/hello/world` too. Add `$` for an exact
/// match.
///
/// # Example
///
/// ```
/// use regex::Regex;
/// use trellis_core::{Context, Request};
/// use trellis_pattern::{Pattern, RegexPattern};
///
/// let pat = RegexPattern::new(Regex::new("^/hello/(?P<name>[a-z]+)$").unwrap());
/// assert_eq!(pat.prefix(), "/hello/");
///
/// let req = Request::get("/hello/world");
/// assert!(pat.matches(&req));
///
/// let ctx = pat.run(&req, Context::background());
/// assert_eq!(ctx.param("name"), Some("world"));
/// ```
#[derive(Debug, Clone)]
pub struct RegexPattern {
    re: Regex,
    prefix: String,
    /// Capture group names; `names[i - 1]` is the name for group `i`.
    names: Vec<String>,
}

impl RegexPattern {
    /// Builds a pattern from a compiled expression, anchoring it on the
    /// left if it is not already.
    #[must_use]
    pub fn new(re: Regex) -> Self {
        let (re, prefix) = anchor_and_prefix(re);
        let names = re
            .capture_names()
            .enumerate()
            .skip(1)
            .map(|(i, name)| name.map_or_else(|| format!("${i}"), str::to_string))
            .collect();

        Self { re, prefix, names }
    }

    /// Returns the expression actually used for matching (possibly the
    /// anchored rewrite of the one given).
    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.re
    }
}

impl Pattern for RegexPattern {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn matches(&self, req: &Request) -> bool {
        self.re.is_match(req.path())
    }

    fn run(&self, req: &Request, ctx: Context) -> Context {
        let Some(caps) = self.re.captures(req.path()) else {
            return ctx;
        };
        if self.names.is_empty() {
            return ctx;
        }

        let mut params = UrlParams::with_capacity(self.names.len());
        for (i, name) in self.names.iter().enumerate() {
            // Group 0 is the whole match; groups that did not participate
            // are omitted.
            if let Some(m) = caps.get(i + 1) {
                params.push(name.clone(), m.as_str());
            }
        }

        if params.is_empty() {
            ctx
        } else {
            ctx.with_url_params(params)
        }
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexPattern({})", self.re.as_str())
    }
}

/// Returns a left-anchored equivalent of `re` and the literal prefix all
/// of its matches share.
fn anchor_and_prefix(re: Regex) -> (Regex, String) {
    let raw = re.as_str().to_string();

    let mut parser = regex_syntax::Parser::new();
    let hir = match parser.parse(&raw) {
        Ok(hir) => hir,
        Err(err) => {
            tracing::warn!(
                pattern = %raw,
                error = %err,
                "unable to analyze regex; route will match without a literal prefix"
            );
            return (re, String::new());
        }
    };

    let prefix = literal_prefix(&hir).0;

    // Already guaranteed to match only at the start of the path.
    if hir.properties().look_set_prefix().contains(Look::Start) {
        return (re, prefix);
    }

    match Regex::new(&format!(r"\A(?:{raw})")) {
        Ok(anchored) => (anchored, prefix),
        Err(err) => {
            // The prefix is only a prefix of anchored matches, so it is
            // dropped along with the failed rewrite.
            tracing::warn!(
                pattern = %raw,
                error = %err,
                "unable to left-anchor regex; route may match mid-path"
            );
            (re, String::new())
        }
    }
}

/// Walks `hir` from the front, concatenating characters that every match
/// must begin with. The boolean is true when the walked node was consumed
/// entirely, i.e. the walk may continue past it.
fn literal_prefix(hir: &Hir) -> (String, bool) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(Look::Start) => (String::new(), true),
        HirKind::Literal(lit) => match std::str::from_utf8(&lit.0) {
            Ok(s) => (s.to_string(), true),
            Err(err) => {
                let valid = err.valid_up_to();
                (
                    String::from_utf8_lossy(&lit.0[..valid]).into_owned(),
                    false,
                )
            }
        },
        // A class that admits exactly one character is as good as a
        // literal. A case-insensitive letter compiles to a two-character
        // class, so this is also where case-folding stops the walk.
        HirKind::Class(class) => {
            single_char(class).map_or_else(|| (String::new(), false), |c| (c.to_string(), true))
        }
        // Group boundaries do not affect the prefix.
        HirKind::Capture(cap) => literal_prefix(&cap.sub),
        HirKind::Concat(parts) => {
            let mut buf = String::new();
            for part in parts {
                let (s, complete) = literal_prefix(part);
                buf.push_str(&s);
                if !complete {
                    return (buf, false);
                }
            }
            (buf, true)
        }
        // Alternations, repetitions, and non-start look-arounds all admit
        // more than one continuation.
        _ => (String::new(), false),
    }
}

fn single_char(class: &Class) -> Option<char> {
    match class {
        Class::Unicode(cls) => {
            let ranges = cls.ranges();
            (ranges.len() == 1 && ranges[0].start() == ranges[0].end())
                .then(|| ranges[0].start())
        }
        Class::Bytes(cls) => {
            let ranges = cls.ranges();
            (ranges.len() == 1
                && ranges[0].start() == ranges[0].end()
                && ranges[0].start().is_ascii())
            .then(|| char::from(ranges[0].start()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(expr: &str) -> RegexPattern {
        RegexPattern::new(Regex::new(expr).unwrap())
    }

    fn check(pat: &RegexPattern, path: &str, want: Option<&[(&str, &str)]>) {
        let req = Request::get(path);
        assert_eq!(pat.matches(&req), want.is_some(), "match of {path:?}");

        let ctx = pat.run(&req, Context::background());
        match want {
            None | Some(&[]) => {
                assert!(ctx.url_params().is_none(), "no params expected for {path:?}");
            }
            Some(pairs) => {
                let params = ctx.url_params().expect("params bound");
                assert_eq!(params.len(), pairs.len(), "param count for {path:?}");
                for (name, value) in pairs {
                    assert_eq!(params.get(name), Some(*value), "param {name:?}");
                }
            }
        }
    }

    #[test]
    fn fully_anchored_literal() {
        let p = pat("^/hello$");
        assert_eq!(p.prefix(), "/hello");

        check(&p, "/hello", Some(&[]));
        check(&p, "/hell", None);
        check(&p, "/hello/", None);
        check(&p, "/hello/world", None);
        check(&p, "/world", None);
    }

    #[test]
    fn named_group() {
        let p = pat("^/hello/(?P<name>[a-z]+)$");
        assert_eq!(p.prefix(), "/hello/");

        check(&p, "/hello/world", Some(&[("name", "world")]));
        check(&p, "/hello/", None);
        check(&p, "/hello/my/love", None);
    }

    #[test]
    fn multiple_named_groups() {
        let p = pat(r"^/a(?P<a>\d+)/b(?P<b>\d+)/?$");
        assert_eq!(p.prefix(), "/a");

        check(&p, "/a1/b2", Some(&[("a", "1"), ("b", "2")]));
        check(&p, "/a9001/b007/", Some(&[("a", "9001"), ("b", "007")]));
        check(&p, "/a/b", None);
        check(&p, "/a", None);
        check(&p, "/squirrel", None);
    }

    #[test]
    fn unnamed_group_gets_synthetic_name() {
        let p = pat("^/hello/([a-z]+)$");
        assert_eq!(p.prefix(), "/hello/");

        check(&p, "/hello/world", Some(&[("$1", "world")]));
        check(&p, "/hello/", None);
    }

    #[test]
    fn unanchored_expression_is_anchored_on_the_left() {
        let p = pat("/hello");
        assert_eq!(p.prefix(), "/hello");

        check(&p, "/hello", Some(&[]));
        check(&p, "/hell", None);
        // Left-anchored only: matching a prefix of the path is a match.
        check(&p, "/hello/", Some(&[]));
        check(&p, "/hello/world", Some(&[]));
        check(&p, "/world/hello", None);
    }

    #[test]
    fn anchoring_preserves_alternations() {
        // A naive "\A" + "a|b" rewrite would anchor only the first branch.
        let p = pat("/cats|/dogs");
        check(&p, "/cats", Some(&[]));
        check(&p, "/dogs", Some(&[]));
        check(&p, "/pets/dogs", None);
    }

    #[test]
    fn non_participating_group_is_omitted() {
        let p = pat("^/x/(?:(?P<a>a+)|(?P<b>b+))$");
        check(&p, "/x/aaa", Some(&[("a", "aaa")]));
        check(&p, "/x/bb", Some(&[("b", "bb")]));
    }

    #[test]
    fn prefix_stops_at_case_insensitivity() {
        let p = pat("^/api/(?i)token");
        assert_eq!(p.prefix(), "/api/");

        check(&p, "/api/TOKEN", Some(&[]));
        check(&p, "/api/token/extra", Some(&[]));
    }

    #[test]
    fn prefix_descends_through_groups() {
        let p = pat("^/v(1)/users");
        assert_eq!(p.prefix(), "/v1/users");
    }

    #[test]
    fn alternation_has_no_prefix() {
        let p = pat("^(?:/a|/b)$");
        assert_eq!(p.prefix(), "");
        check(&p, "/a", Some(&[]));
        check(&p, "/b", Some(&[]));
        check(&p, "/c", None);
    }

    #[test]
    fn run_on_non_match_leaves_context_unchanged() {
        let p = pat("^/hello/(?P<name>[a-z]+)$");
        let ctx = p.run(&Request::get("/nope"), Context::background());
        assert!(ctx.url_params().is_none());
    }

    #[test]
    fn display_shows_expression() {
        let p = pat("^/hello$");
        assert_eq!(p.to_string(), "RegexPattern(^/hello$)");
        assert_eq!(p.as_regex().as_str(), "^/hello$");
    }
}
