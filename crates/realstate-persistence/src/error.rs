//! Error types for directory lookups.

use thiserror::Error;

/// Errors raised by the lookup client.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST endpoint answered with a non-success status.
    #[error("database API returned {status} for {table}: {body}")]
    Status {
        /// Table the request targeted.
        table: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body did not match the expected row shape.
    #[error("failed to decode {table} rows: {source}")]
    Decode {
        /// Table the rows came from.
        table: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An insert returned no row.
    #[error("insert into {0} returned no rows")]
    Empty(&'static str),
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
