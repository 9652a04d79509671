//! The abstract request boundary.

use http::Method;

/// The read-only view of an inbound request this core routes on.
///
/// The core is transport-agnostic: whatever HTTP (or HTTP-like) layer
/// hosts it only needs to surface a method and a path. Pattern matching
/// treats the request as immutable.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
}

impl Request {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Shorthand for a `GET` request, handy in tests.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let req = Request::new(Method::POST, "/users");
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/users");
    }

    #[test]
    fn get_shorthand() {
        let req = Request::get("/health");
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/health");
    }
}
