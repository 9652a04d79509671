//! Bound URL parameter storage.
//!
//! Parameters extracted by a pattern match are stored as ordered
//! (name, value) pairs with a small-vector optimization, since the vast
//! majority of routes bind only a handful of variables.

use smallvec::SmallVec;

/// Number of parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// The reserved parameter name a wildcard pattern binds the path tail to.
pub const WILDCARD: &str = "*";

/// URL parameters bound by a successful pattern match.
///
/// Insertion order is preserved, which matters for nothing except
/// debuggability - lookups are by name.
///
/// # Example
///
/// ```
/// use trellis_core::UrlParams;
///
/// let mut params = UrlParams::new();
/// params.push("user", "bob");
/// params.push("post", "42");
///
/// assert_eq!(params.get("user"), Some("bob"));
/// assert_eq!(params.get("missing"), None);
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl UrlParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty parameter set with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Appends a bound parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the tail bound by a wildcard pattern, if any.
    ///
    /// Equivalent to `get("*")`; the tail includes the separator that
    /// immediately precedes it (`"/friends/123"`, not `"friends/123"`).
    #[must_use]
    pub fn wildcard(&self) -> Option<&str> {
        self.get(WILDCARD)
    }

    /// Returns true if no parameters are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over the bound (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for UrlParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut params = UrlParams::new();
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn wildcard_accessor() {
        let mut params = UrlParams::new();
        assert_eq!(params.wildcard(), None);

        params.push(WILDCARD, "/friends/123");
        assert_eq!(params.wildcard(), Some("/friends/123"));
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut params = UrlParams::new();
        params.push("a", "1");
        params.push("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn spills_past_inline_capacity() {
        let mut params = UrlParams::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }

    #[test]
    fn from_iterator() {
        let params: UrlParams = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }
}
