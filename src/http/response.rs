//! HTTP response builder.
//!
//! Provides a fluent builder API for constructing the response value that
//! renderer backends produce and the embedding server serializes.

use bytes::Bytes;

use super::{Headers, StatusCode};

/// An HTTP response: status code, headers, and body.
///
/// How the response reaches the wire is the embedding server's concern;
/// this type only carries the data.
///
/// # Examples
///
/// ```
/// use restroute::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .with_body(r#"{"status":"ok"}"#);
///
/// assert_eq!(response.status(), StatusCode::Ok);
/// assert_eq!(response.content_type(), Some("application/json"));
/// assert_eq!(&response.body()[..], br#"{"status":"ok"}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a `200 OK` response with an HTML body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(StatusCode::Ok)
            .header("Content-Type", "text/html; charset=utf-8")
            .with_body(body.into())
    }

    /// Creates a `200 OK` response with a pre-serialized JSON body.
    pub fn json_str(body: impl Into<String>) -> Self {
        Self::new(StatusCode::Ok)
            .header("Content-Type", "application/json")
            .with_body(body.into())
    }

    /// Creates a `303 See Other` redirect to `location`.
    pub fn see_other(location: impl Into<String>) -> Self {
        Self::new(StatusCode::SeeOther).header("Location", location)
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a header in-place. Intended for callers that receive a
    /// `Response` from a backend and need to decorate it without consuming it.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Sets the response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the status code, keeping headers and body.
    ///
    /// Used by the cross-action rendering pattern: render another action's
    /// representation, then downgrade the status (e.g. to `422`) before
    /// returning it.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the `Content-Type` header value without its parameters
    /// (everything before the first `;`), if set.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get("content-type")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    /// Returns the response body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}
