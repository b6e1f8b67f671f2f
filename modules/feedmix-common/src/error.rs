use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

/// Failure categories shared by every feed provider. Construction-time
/// credential problems are fatal and local to the constructor; fetch-time
/// problems surface through the provider's result.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("[{platform}] {message}")]
    Provider { platform: String, message: String },

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Mapping error: {0}")]
    Mapping(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}
