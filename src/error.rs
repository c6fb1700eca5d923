//! Error types for the catalog importer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the catalog importer.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("Invalid column mapping: {0}")]
    InvalidColumnMapping(String),

    // Row-level errors
    #[error("Row has no title after applying column mapping")]
    MissingTitle,

    #[error("Row timed out waiting for the catalog provider")]
    RowTimeout,

    // Import/session errors
    #[error("Import contains no parseable rows")]
    EmptyImport,

    #[error("Import session not found: {0}")]
    SessionNotFound(String),

    #[error("Import session already started: {0}")]
    SessionAlreadyStarted(String),

    #[error("Unmatched item not found: {0}")]
    UnmatchedItemNotFound(String),

    // Provider errors
    #[error("Catalog provider unavailable: {0}")]
    ProviderUnavailable(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // CSV errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether the underlying database error is a uniqueness violation.
    ///
    /// The UNIQUE constraints on `records` are the authoritative duplicate
    /// guard; callers treat a violation as "already exists", not a failure.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
