/// Why a fetch produced no metadata. Cloned into negative cache entries so
/// every caller inside the negative TTL sees the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Fetch timed out")]
    Timeout,
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
