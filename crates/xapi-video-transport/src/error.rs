//! Error types for transport construction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint {endpoint}: {detail}")]
    InvalidEndpoint { endpoint: String, detail: String },

    #[error("no tokio runtime available for background delivery")]
    NoRuntime,

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}
