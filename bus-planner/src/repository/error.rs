//! Repository error types.

/// Errors from reading lines and stops.
///
/// These are faults, distinct from a planner finding no plan.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check BUS_PLANNER_API_KEY")]
    Unauthorized,

    /// Requested line does not exist
    #[error("line not found: {0}")]
    NotFound(String),

    /// Store returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response or snapshot file
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Failed to read a snapshot file
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Repository is misconfigured
    #[error("not configured: {0}")]
    NotConfigured(String),
}
