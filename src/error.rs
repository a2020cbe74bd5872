use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Form endpoint unreachable: {0}")]
    Unreachable(String),
}

#[derive(Error, Debug)]
pub enum WaitlistError {
    #[error("Failed to save waitlist entry: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email address is empty")]
    Empty,
    #[error("Invalid email format: {0}")]
    Malformed(String),
}
