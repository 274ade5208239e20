use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors surfaced while browsing or mutating the remote tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// I/O errors (config file reads, output writes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failures: connection refused, timeout, or a
    /// response body that could not be decoded as JSON.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The daemon reported an error (HTTP 500 with an `error` field).
    #[error("server error: {0}")]
    Server(String),

    /// Listing the root path returned no children at all.
    #[error("remote root is empty or inaccessible")]
    EmptyRoot,

    /// Operation targeted a node that has no remote counterpart.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The configured base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// Configuration file errors.
    #[error("config error: {0}")]
    Config(String),
}

impl TreeError {
    /// Whether this error is the empty-root sentinel, as opposed to a
    /// merely-empty non-root folder (which is not an error at all).
    pub fn is_empty_root(&self) -> bool {
        matches!(self, TreeError::EmptyRoot)
    }
}
