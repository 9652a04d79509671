//! The abstract response boundary.

use bytes::{Bytes, BytesMut};
use http::StatusCode;

/// Where handlers write their response.
///
/// The transport layer supplies the real implementation; [`Response`] is a
/// plain buffering one for hosts that want a value back, and for tests.
pub trait ResponseSink {
    /// Sets the response status.
    fn set_status(&mut self, status: StatusCode);

    /// Appends a chunk to the response body.
    fn write_body(&mut self, chunk: &[u8]);
}

/// A buffering [`ResponseSink`].
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: BytesMut,
}

impl Response {
    /// Creates an empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: BytesMut::new(),
        }
    }

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the buffered body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning the body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink for Response {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}

/// Writes the standard not-found response to `sink`.
pub fn write_not_found(sink: &mut dyn ResponseSink) {
    sink.set_status(StatusCode::NOT_FOUND);
    sink.write_body(b"404 page not found\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_ok() {
        let res = Response::new();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.body().is_empty());
    }

    #[test]
    fn buffers_body_chunks() {
        let mut res = Response::new();
        res.write_body(b"hello, ");
        res.write_body(b"world");
        assert_eq!(res.body(), b"hello, world");
        assert_eq!(&res.into_body()[..], b"hello, world");
    }

    #[test]
    fn not_found_helper() {
        let mut res = Response::new();
        write_not_found(&mut res);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"404 page not found\n");
    }
}
