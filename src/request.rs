//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// An incoming HTTP request with its body already collected.
pub struct Request {
    pub(crate) host: Option<String>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        parts: http::request::Parts,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        // HTTP/1.1 carries the host in a header, HTTP/2 in the `:authority`
        // pseudo-header which hyper exposes through the URI.
        let host = parts
            .headers
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parts.uri.authority().map(|a| a.as_str().to_owned()));

        Self { host, body, params }
    }

    pub fn body(&self) -> &[u8] { &self.body }

    /// The `Host` the client addressed, port included when present.
    pub fn host(&self) -> Option<&str> { self.host.as_deref() }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/site/{slug}`, `req.param("slug")` on `/api/site/acme`
    /// returns `Some("acme")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
