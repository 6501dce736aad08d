//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Error bodies are always
//! JSON objects with an `"error"` key; [`Response::error`] builds them.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts
///
/// ```rust
/// use sitegen::{Response, Status};
///
/// Response::text("ok");
/// Response::status(Status::ServiceUnavailable);
/// Response::error(Status::BadRequest, "Slug is required");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use sitegen::{Response, Status};
///
/// Response::builder()
///     .status(Status::Conflict)
///     .header("x-slug", "acme")
///     .json(br#"{"error":"taken"}"#.to_vec());
/// ```
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
}

impl Response {
    /// `application/json` with `status`, serialized from `value`.
    ///
    /// A serialization failure is logged and turned into a bare `500`.
    pub fn json_value<T: Serialize>(status: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::builder().status(status).json(bytes),
            Err(e) => {
                error!("response serialization failed: {e}");
                Self::status(Status::InternalServerError)
            }
        }
    }

    /// JSON error body: `{"error": message}`.
    pub fn error(status: Status, message: impl Into<String>) -> Self {
        Self::json_value(status, &json!({ "error": message.into() }))
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw(TEXT, body.into().into_bytes())
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok,
        }
    }

    /// Converts into the hyper response type handed back to the connection.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(http::StatusCode::from(self.status));
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                // Only reachable with a header that is not valid on the wire.
                error!("invalid response header: {e}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_is_json_object() {
        let res = Response::error(Status::NotFound, "Site not found");
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "error": "Site not found" }));
    }

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::Conflict)
            .header("x-slug", "acme")
            .text("taken");
        assert_eq!(res.headers[0].0, "content-type");
        assert_eq!(res.header("x-slug"), Some("acme"));

        let inner = res.into_inner();
        assert_eq!(inner.status(), http::StatusCode::CONFLICT);
    }
}
