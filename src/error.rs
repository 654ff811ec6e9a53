use thiserror::Error;

/// Failure to build a backend handle from the configured secrets.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("missing secret `{0}`")]
    MissingSecret(&'static str),
    #[error("invalid endpoint url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported endpoint scheme `{0}` (expected https://, http://, postgres:// or postgresql://)")]
    UnsupportedScheme(String),
    #[error("access key cannot be sent as a header")]
    InvalidKey,
    #[error("failed to build client: {0}")]
    Client(String),
}

/// Failure of a query issued against an established handle.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("invalid table name `{0}`")]
    InvalidIdentifier(String),
    #[error("table `{0}` is not in the public table listing")]
    UnlistedTable(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no rows to export")]
    Empty,
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
