use thiserror::Error;

/// Failures surfaced by the document backend client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid document ID: {0:?}")]
    InvalidDocumentId(String),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return BackendError::Decode(err.to_string());
        }

        return BackendError::Transport(err.to_string());
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        return BackendError::Decode(err.to_string());
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        return BackendError::InvalidUpload(err.to_string());
    }
}
