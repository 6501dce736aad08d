//! Process-level error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Failures that stop sitegen from starting or serving.
///
/// Request-level failures (404, 409, a datastore error on one insert) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces configuration problems, client construction, binding
/// to a port and accepting connections.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
