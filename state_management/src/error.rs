use state::error::KeystoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Corrupt entry under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Refusing to store the zero value hash.")]
    ZeroValueHash,
}

impl From<StoreError> for KeystoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::ZeroValueHash => KeystoreError::MalformedInput(error.to_string()),
            other => KeystoreError::Storage(other.to_string()),
        }
    }
}
