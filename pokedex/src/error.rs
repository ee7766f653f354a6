use thiserror::Error;

/// Failure of a single remote request.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("response parse error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Network failures and non-success statuses share one retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if err.is_decode() => FetchError::Decode(err.to_string()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),
    #[error("store serialize error: {0}")]
    Serialize(String),
}
