//! Error types for the Solrium library.
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! [`SolriumError`] enum. The variants follow the life of a request:
//! local precondition failures are raised before anything is sent,
//! transport failures come from the adapter, and HTTP/Solr/parse failures
//! are raised while turning a response into a result.
//!
//! # Examples
//!
//! ```
//! use solrium::error::{Result, SolriumError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SolriumError::invalid_argument("rows must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Solrium operations.
#[derive(Error, Debug)]
pub enum SolriumError {
    /// Connection refused, timeout, DNS failure and other transport problems.
    ///
    /// This is the only kind of failure the load balancer fails over on
    /// by default.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Solr answered with a non-2xx HTTP status.
    #[error("Solr HTTP error: {message} ({status})")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Status message, or the `error.msg` reported by Solr when present.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// Solr answered 2xx but reported a non-zero status in the response header.
    #[error("Solr error status {status}: {message}")]
    Solr {
        /// Status value from `responseHeader.status`.
        status: i64,
        /// Error message reported by Solr.
        message: String,
    },

    /// A local file needed for the request could not be read.
    #[error("File access error: {0}")]
    FileAccess(String),

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No builder/parser is registered for a query type.
    #[error("Unsupported query type: {0}")]
    UnsupportedQueryType(String),

    /// A builder or parser received a query of the wrong concrete type.
    #[error("Query type mismatch: expected {expected}, got {actual}")]
    QueryTypeMismatch {
        /// Query type the component was registered for.
        expected: String,
        /// Query type it was handed.
        actual: String,
    },

    /// The response body does not match the declared writer format.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// I/O errors (reading upload files, config files, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML reader errors.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SolriumError.
pub type Result<T> = std::result::Result<T, SolriumError>;

impl SolriumError {
    /// Create a new transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        SolriumError::Transport(msg.into())
    }

    /// Create a new HTTP error.
    pub fn http<S: Into<String>, B: Into<String>>(status: u16, message: S, body: B) -> Self {
        SolriumError::Http {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        SolriumError::Parse(msg.into())
    }

    /// Create a new file access error.
    pub fn file_access<S: Into<String>>(msg: S) -> Self {
        SolriumError::FileAccess(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SolriumError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SolriumError::Config(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SolriumError::InvalidOperation(msg.into())
    }

    /// Create a new unsupported query type error.
    pub fn unsupported_query_type<S: Into<String>>(query_type: S) -> Self {
        SolriumError::UnsupportedQueryType(query_type.into())
    }

    /// Create a new query type mismatch error.
    pub fn query_type_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        SolriumError::QueryTypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, SolriumError::Transport(_))
    }

    /// HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SolriumError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SolriumError::transport("connection refused");
        assert_eq!(error.to_string(), "Transport error: connection refused");
        assert!(error.is_transport());

        let error = SolriumError::http(404, "Not Found", "<html/>");
        assert_eq!(error.to_string(), "Solr HTTP error: Not Found (404)");
        assert_eq!(error.status_code(), Some(404));
        assert!(!error.is_transport());

        let error = SolriumError::query_type_mismatch("select", "update");
        assert_eq!(
            error.to_string(),
            "Query type mismatch: expected select, got update"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let solrium_error = SolriumError::from(io_error);

        match solrium_error {
            SolriumError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
