//! Error types for swc-core

use std::fmt;

use http::{Method, StatusCode};
use thiserror::Error;

/// Result type alias for swc-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for swc operations
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be exchanged with the server
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a status code the operation does not accept
    #[error(transparent)]
    UnexpectedStatus(#[from] UnexpectedStatusError),

    /// A header returned by the server (or set by the caller) does not parse
    #[error("Bad header {name}: {message}")]
    BadHeader { name: String, message: String },

    /// The Etag reported for an uploaded object differs from the MD5 of the
    /// data that was sent. The object is stored at this point.
    #[error(
        "Etag on uploaded object ({actual}) does not match MD5 checksum of uploaded data ({expected})"
    )]
    ChecksumMismatch { expected: String, actual: String },

    /// A bulk request completed with at least one failure
    #[error(transparent)]
    Bulk(#[from] BulkError),

    /// A listing or bulk report could not be interpreted
    #[error("Bad response: {0}")]
    BadResponse(String),

    /// The request cannot be built from the given handles or arguments
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Token acquisition failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status code carried by this error, if any.
    ///
    /// Unexpected-status errors report the status the server sent; bulk errors
    /// report the overall status of the bulk request.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus(e) => Some(e.actual),
            Error::Bulk(e) => Some(e.status_code),
            _ => None,
        }
    }

    /// Check whether this error carries the given status code
    pub fn is_status(&self, code: StatusCode) -> bool {
        self.status() == Some(code)
    }

    /// Shorthand for `is_status(StatusCode::NOT_FOUND)`
    pub fn is_not_found(&self) -> bool {
        self.is_status(StatusCode::NOT_FOUND)
    }
}

/// Returned when a response has a status code outside the set the operation expects.
#[derive(Debug, Clone, Error)]
pub struct UnexpectedStatusError {
    pub method: Method,
    pub url: String,
    pub expected: Vec<StatusCode>,
    pub actual: StatusCode,
    /// Leading part of the response body, for diagnostics
    pub body: String,
}

impl fmt::Display for UnexpectedStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = self
            .expected
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "expected {expected} response, got {} instead",
            self.actual.as_u16()
        )?;
        if !self.body.is_empty() {
            write!(f, ": {}", self.body)?;
        }
        Ok(())
    }
}

/// Composite error for bulk operations.
///
/// `status_code` and `overall_error` describe the request as a whole;
/// `object_errors` lists the items that failed individually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct BulkError {
    pub status_code: StatusCode,
    pub overall_error: String,
    pub object_errors: Vec<BulkObjectError>,
}

impl fmt::Display for BulkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.object_errors.is_empty() {
            write!(f, "{}: {}", self.status_code, self.overall_error)
        } else {
            write!(
                f,
                "{} (+{} object errors)",
                self.status_code,
                self.object_errors.len()
            )
        }
    }
}

/// A single failed item within a bulk operation.
///
/// `object_name` is empty when the item refers to a whole container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct BulkObjectError {
    pub container_name: String,
    pub object_name: String,
    pub status_code: StatusCode,
}

impl fmt::Display for BulkObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.object_name.is_empty() {
            write!(f, "{}: {}", self.container_name, self.status_code)
        } else {
            write!(
                f,
                "{}/{}: {}",
                self.container_name, self.object_name, self.status_code
            )
        }
    }
}
