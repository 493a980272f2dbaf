//! Errors that might happen in the crate

use http::StatusCode;

use crate::version::Version;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("point is invalid: {error}")]
    /// Error happens when a point fails validation before any I/O
    InvalidPointError { error: String },

    #[error("invalid argument: {error}")]
    /// Error happens when a caller-supplied argument fails validation
    InvalidArgumentError { error: String },

    #[error("Failed to build URL: {error}")]
    /// Error happens when the request URL cannot be constructed
    UrlConstructionError { error: String },

    #[error("connection error: {error}")]
    /// Error happens when the HTTP call itself fails
    ConnectionError { error: String },

    #[error("could not deserialize response: {error}")]
    /// Error happens when Serde cannot deserialize the response
    DeserializationError { error: String },

    #[error("InfluxDB returned {status_code}: {body}")]
    /// Error status reported by the server, or an error embedded in an
    /// otherwise successful query response
    ApiError { status_code: StatusCode, body: String },

    #[error("operation {operation} is not supported by the {version} protocol")]
    /// Error happens when the bound wire dialect has no equivalent for
    /// the requested operation
    NotSupportedError {
        version: Version,
        operation: &'static str,
    },

    #[error("could not detect server version: {error}")]
    /// Error happens when auto-detection cannot reach or reconcile the server
    VersionDetectionError { error: String },
}
