use thiserror::Error;

/// Any failed exchange with the oracle. The session controller treats every
/// variant the same way; the split only exists for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("oracle responded with status {status}")]
    Status { status: u16 },
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Malformed(err.to_string());
        }
        Self::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LevelSelectionError {
    #[error("level selection rejected: {0}")]
    Rejected(String),
    #[error("level selection failed: {0}")]
    Transport(#[from] TransportError),
}
