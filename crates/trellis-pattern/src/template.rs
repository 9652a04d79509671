//! Path template patterns.

use std::fmt;

use trellis_core::{Context, Request, UrlParams, WILDCARD};

use crate::{Pattern, PatternError};

// Break characters end a variable's greedy match and may not appear in
// variable names. `/` is the path separator, `.` commonly delimits file
// extensions, and `;`/`,` are the sub-delimiters RFC 3986 section 3.3
// suggests for path segments.
fn is_break(b: u8) -> bool {
    matches!(b, b'/' | b'.' | b';' | b',')
}

/// A parsed path template.
///
/// Templates are literal paths with embedded variables: a break character
/// followed by `:name` matches one-or-more non-break characters greedily
/// and binds them to `name`. A trailing `/*` makes the template a
/// wildcard: the path only has to start with the literal part, and the
/// unmatched tail (including its leading `/`) is bound to `*`.
///
/// # Example
///
/// ```
/// use trellis_core::{Context, Request};
/// use trellis_pattern::{Pattern, TemplatePattern};
///
/// let pat = TemplatePattern::parse("/hello/:name").unwrap();
/// assert_eq!(pat.prefix(), "/hello/");
///
/// let req = Request::get("/hello/world");
/// assert!(pat.matches(&req));
///
/// let ctx = pat.run(&req, Context::background());
/// assert_eq!(ctx.param("name"), Some("world"));
///
/// // An empty binding is never a match: /hello/ does not satisfy :name.
/// assert!(!pat.matches(&Request::get("/hello/")));
/// ```
#[derive(Debug, Clone)]
pub struct TemplatePattern {
    /// The template as given, for diagnostics.
    raw: String,
    /// Variable names in order of appearance.
    vars: Vec<String>,
    /// The character terminating each variable's greedy match. The final
    /// variable of a template is terminated by `/`.
    breaks: Vec<u8>,
    /// Literal text around the variables; always exactly one more entry
    /// than `vars` (before the first, between each pair, after the last).
    literals: Vec<String>,
    /// Whether the template ended in `/*`.
    wildcard: bool,
}

impl TemplatePattern {
    /// Parses a path template.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for a dangling `:` with no variable
    /// name, or for a variable name bound twice in one template.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let raw = template.to_string();

        // Strip a wildcard suffix down to its trailing separator.
        let (s, wildcard) = match template.strip_suffix("/*") {
            Some(head) => (&template[..head.len() + 1], true),
            None => (template, false),
        };
        let bytes = s.as_bytes();

        let mut vars: Vec<String> = Vec::new();
        let mut breaks = Vec::new();
        let mut literals = Vec::new();

        let mut lit_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if !(is_break(bytes[i]) && bytes.get(i + 1) == Some(&b':')) {
                i += 1;
                continue;
            }

            let name_start = i + 2;
            let mut end = name_start;
            while end < bytes.len() && !is_break(bytes[end]) {
                end += 1;
            }
            if end == name_start {
                return Err(PatternError::EmptyVariable {
                    template: raw,
                    position: i,
                });
            }

            let name = &s[name_start..end];
            if vars.iter().any(|v| v == name) {
                return Err(PatternError::DuplicateVariable {
                    template: raw,
                    name: name.to_string(),
                });
            }

            // The literal keeps the break character; the colon is dropped.
            literals.push(s[lit_start..=i].to_string());
            vars.push(name.to_string());
            breaks.push(if end == bytes.len() { b'/' } else { bytes[end] });

            lit_start = end;
            i = end;
        }
        literals.push(s[lit_start..].to_string());

        Ok(Self {
            raw,
            vars,
            breaks,
            literals,
            wildcard,
        })
    }

    /// Returns the template as given.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Walks the literal/variable list against `path`, optionally binding
    /// matched variables into `bind`. On failure, anything already pushed
    /// into `bind` is the caller's to discard.
    fn match_path(&self, path: &str, mut bind: Option<&mut UrlParams>) -> bool {
        let mut path = path;

        for (i, var) in self.vars.iter().enumerate() {
            let Some(rest) = path.strip_prefix(self.literals[i].as_str()) else {
                return false;
            };
            path = rest;

            let bc = self.breaks[i];
            let bytes = path.as_bytes();
            let mut m = 0;
            while m < bytes.len() && bytes[m] != bc && bytes[m] != b'/' {
                m += 1;
            }
            if m == 0 {
                // Empty bindings are not matches, otherwise "/:foo" would
                // match the path "/".
                return false;
            }

            if let Some(params) = bind.as_mut() {
                params.push(var.clone(), &path[..m]);
            }
            path = &path[m..];
        }

        let tail = self.literals[self.vars.len()].as_str();
        if self.wildcard {
            // The tail literal ends at the wildcard's separator; the path
            // only has to reach it.
            if !path.starts_with(tail) {
                return false;
            }
            if let Some(params) = bind.as_mut() {
                params.push(WILDCARD, &path[tail.len() - 1..]);
            }
            true
        } else {
            path == tail
        }
    }
}

impl Pattern for TemplatePattern {
    fn prefix(&self) -> &str {
        &self.literals[0]
    }

    fn matches(&self, req: &Request) -> bool {
        self.match_path(req.path(), None)
    }

    fn run(&self, req: &Request, ctx: Context) -> Context {
        let mut params = UrlParams::with_capacity(self.vars.len() + usize::from(self.wildcard));
        if self.match_path(req.path(), Some(&mut params)) && !params.is_empty() {
            ctx.with_url_params(params)
        } else {
            ctx
        }
    }
}

impl fmt::Display for TemplatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplatePattern({:?})", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn check(pat: &TemplatePattern, path: &str, want: Option<&[(&str, &str)]>) {
        let req = Request::get(path);
        assert_eq!(pat.matches(&req), want.is_some(), "match of {path:?}");

        let ctx = pat.run(&req, Context::background());
        match want {
            None | Some(&[]) => assert!(
                ctx.url_params().is_none(),
                "no params expected for {path:?}"
            ),
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
    fn literal_only() {
        let pat = TemplatePattern::parse("/hello").unwrap();
        assert_eq!(pat.prefix(), "/hello");

        check(&pat, "/hello", Some(&[]));
        check(&pat, "/hell", None);
        check(&pat, "/hello/", None);
        check(&pat, "/hello/world", None);
    }

    #[test]
    fn single_variable() {
        let pat = TemplatePattern::parse("/hello/:name").unwrap();
        assert_eq!(pat.prefix(), "/hello/");

        check(&pat, "/hello/world", Some(&[("name", "world")]));
        // '.' and ';' are not this variable's break character, so they
        // are consumed greedily.
        check(&pat, "/hello/my.world;wow", Some(&[("name", "my.world;wow")]));
        check(&pat, "/hell", None);
        check(&pat, "/hello/", None);
        check(&pat, "/hello/my/love", None);
    }

    #[test]
    fn two_variables() {
        let pat = TemplatePattern::parse("/a/:a/b/:b").unwrap();
        assert_eq!(pat.prefix(), "/a/");

        check(&pat, "/a/1/b/2", Some(&[("a", "1"), ("b", "2")]));
        check(&pat, "/a", None);
        check(&pat, "/a//b/", None);
        check(&pat, "/a/1/b/2/3", None);
    }

    #[test]
    fn dot_break_character() {
        let pat = TemplatePattern::parse("/a/:b.:c").unwrap();

        check(&pat, "/a/cat.gif", Some(&[("b", "cat"), ("c", "gif")]));
        // :b stops at the first '.', :c (final variable) runs to '/'.
        check(&pat, "/a/cat.tar.gz", Some(&[("b", "cat"), ("c", "tar.gz")]));
        check(&pat, "/a", None);
        check(&pat, "/a/cat", None);
        check(&pat, "/a/cat/gif", None);
        check(&pat, "/a/cat.", None);
        check(&pat, "/a/cat/dog.gif", None);
    }

    #[test]
    fn wildcard_tail() {
        let pat = TemplatePattern::parse("/user/:user/*").unwrap();
        assert_eq!(pat.prefix(), "/user/");

        check(&pat, "/user/bob/", Some(&[("user", "bob"), ("*", "/")]));
        check(
            &pat,
            "/user/bob/friends/123",
            Some(&[("user", "bob"), ("*", "/friends/123")]),
        );
        check(&pat, "/user/bob", None);
        check(&pat, "/user/", None);
        check(&pat, "/user//", None);
    }

    #[test]
    fn wildcard_after_literal() {
        let pat = TemplatePattern::parse("/user/:user/friends/*").unwrap();

        check(
            &pat,
            "/user/bob/friends/",
            Some(&[("user", "bob"), ("*", "/")]),
        );
        check(
            &pat,
            "/user/bob/friends/123",
            Some(&[("user", "bob"), ("*", "/123")]),
        );
        check(&pat, "/user/bob/enemies", None);
    }

    #[test]
    fn variable_at_start() {
        let pat = TemplatePattern::parse("/:foo").unwrap();
        assert_eq!(pat.prefix(), "/");

        check(&pat, "/bar", Some(&[("foo", "bar")]));
        check(&pat, "/", None);
    }

    #[test]
    fn matches_never_binds() {
        let pat = TemplatePattern::parse("/hello/:name").unwrap();
        let req = Request::get("/hello/world");

        assert!(pat.matches(&req));
        // A pure match must not have touched any context; run on a fresh
        // context is the only way bindings appear.
        let ctx = Context::background();
        assert!(pat.matches(&req));
        assert!(ctx.url_params().is_none());
    }

    #[test]
    fn run_on_non_match_leaves_context_unchanged() {
        let pat = TemplatePattern::parse("/a/:a/b/:b").unwrap();
        // The first variable binds before the walk fails on the second.
        let ctx = pat.run(&Request::get("/a/1/x/2"), Context::background());
        assert!(ctx.url_params().is_none());
    }

    #[test]
    fn literals_outnumber_vars_by_one() {
        let pat = TemplatePattern::parse("/a/:a/b/:b").unwrap();
        assert_eq!(pat.literals.len(), pat.vars.len() + 1);

        let pat = TemplatePattern::parse("/plain").unwrap();
        assert_eq!(pat.literals.len(), 1);
        assert!(pat.vars.is_empty());
    }

    #[test]
    fn dangling_colon_is_rejected() {
        assert!(matches!(
            TemplatePattern::parse("/users/:"),
            Err(PatternError::EmptyVariable { position: 6, .. })
        ));
        assert!(matches!(
            TemplatePattern::parse("/:/x"),
            Err(PatternError::EmptyVariable { .. })
        ));
    }

    #[test]
    fn duplicate_variable_is_rejected() {
        assert!(matches!(
            TemplatePattern::parse("/a/:x/b/:x"),
            Err(PatternError::DuplicateVariable { ref name, .. }) if name == "x"
        ));
    }

    #[test]
    fn colon_mid_literal_is_literal() {
        // Only a break character introduces a variable; a colon elsewhere
        // is ordinary text.
        let pat = TemplatePattern::parse("/a:b").unwrap();
        check(&pat, "/a:b", Some(&[]));
        check(&pat, "/a/b", None);
    }

    #[test]
    fn display_shows_raw_template() {
        let pat = TemplatePattern::parse("/a/:b").unwrap();
        assert_eq!(pat.to_string(), "TemplatePattern(\"/a/:b\")");
        assert_eq!(pat.raw(), "/a/:b");
    }

    proptest! {
        #[test]
        fn binds_exactly_the_segment(value in "[a-zA-Z0-9_-]{1,12}") {
            let pat = TemplatePattern::parse("/p/:name").unwrap();
            let req = Request::get(format!("/p/{value}"));
            prop_assert!(pat.matches(&req));

            let ctx = pat.run(&req, Context::background());
            prop_assert_eq!(ctx.param("name"), Some(value.as_str()));
        }

        #[test]
        fn never_matches_an_empty_segment(tail in "(/[a-z0-9]{0,6}){0,3}") {
            let pat = TemplatePattern::parse("/p/:name").unwrap();
            // The generated tail is empty or starts with '/', so the
            // variable's segment is always empty and must never match.
            let req = Request::get(format!("/p/{tail}"));
            prop_assert!(!pat.matches(&req));
        }
    }
}
