//! HTTP status codes as a typed enum.
//!
//! Only the codes sitegen actually answers with are listed. Use [`Status`]
//! anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()` or `Response::error()`.
//!
//! ```rust
//! use sitegen::{Response, Status};
//!
//! Response::status(Status::ServiceUnavailable);
//! Response::error(Status::NotFound, "Site not found");
//! ```

/// Status codes produced by the sitegen endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                            // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,                    // 400
    NotFound,                      // 404
    MethodNotAllowed,              // 405
    Conflict,                      // 409

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,           // 500
    ServiceUnavailable,            // 503
}

impl Status {
    /// Numeric code, e.g. `404`.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                  => 200,
            Self::BadRequest          => 400,
            Self::NotFound            => 404,
            Self::MethodNotAllowed    => 405,
            Self::Conflict            => 409,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable  => 503,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        // Every variant above is a registered code, so this never falls back.
        http::StatusCode::from_u16(s.as_u16()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
