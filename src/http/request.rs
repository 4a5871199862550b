//! The request value handed to the dispatch core by the embedding server.
//!
//! Parsing bytes off the wire is not this crate's job. Whatever HTTP stack
//! hosts the core builds a [`Request`] from its own native request type —
//! method, path, headers, plus the already-decoded query and form parameter
//! maps — and passes it to the dispatcher.

use std::collections::HashMap;

use super::{Headers, Method};

/// A generic HTTP request value: method, path, headers, and decoded
/// query/form parameters.
///
/// Constructed with a fluent builder. The two parameter maps matter to the
/// core for exactly two keys: `format` (a MIME shortcode overriding the
/// `Accept` header during negotiation) and `_method` (verb emulation on
/// `POST` for clients that cannot issue `PUT`/`DELETE` directly).
///
/// # Examples
///
/// ```
/// use restroute::http::{Method, Request};
///
/// let req = Request::new(Method::Post, "/users/42/")
///     .header("Accept", "text/html")
///     .query("format", "json")
///     .form("_method", "delete");
///
/// assert_eq!(req.effective_method(), Method::Delete);
/// assert_eq!(req.format_param(), Some("json"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: Headers,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl Request {
    /// Creates a request with the given method and path and no headers or
    /// parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            query: HashMap::new(),
            form: HashMap::new(),
        }
    }

    /// Appends a header entry.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a decoded query-string parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a decoded form-body parameter.
    #[must_use]
    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Returns the HTTP method as sent by the client.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the method after applying the `_method` override.
    ///
    /// A `_method` parameter (form first, then query) on a `POST` request
    /// remaps the effective method, letting HTML forms emulate `PUT`,
    /// `DELETE`, and `PATCH`. The override is ignored on non-POST requests
    /// and for values that are not one of those three verbs.
    pub fn effective_method(&self) -> Method {
        if self.method != Method::Post {
            return self.method.clone();
        }
        let requested = self
            .form_param("_method")
            .or_else(|| self.query_param("_method"));
        match requested.map(str::to_ascii_uppercase).as_deref() {
            Some("PUT") => Method::Put,
            Some("DELETE") => Method::Delete,
            Some("PATCH") => Method::Patch,
            _ => Method::Post,
        }
    }

    /// Returns the request path (without any query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the raw `Accept` header value, if present.
    pub fn accept(&self) -> Option<&str> {
        self.headers.get("accept")
    }

    /// Returns a query parameter value by key.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns a form parameter value by key.
    pub fn form_param(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    /// Returns the `format` parameter (query first, then form), if present.
    ///
    /// The value is a MIME shortcode (`json`, `html`, ...) that takes
    /// precedence over the `Accept` header during content negotiation.
    pub fn format_param(&self) -> Option<&str> {
        self.query_param("format").or_else(|| self.form_param("format"))
    }
}
