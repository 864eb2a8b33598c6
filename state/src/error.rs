use std::fmt;
use thiserror::Error;

/// Which side of a transition failed to reproduce its commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentSide {
    Current,
    New,
}

impl fmt::Display for CommitmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitmentSide::Current => write!(f, "current"),
            CommitmentSide::New => write!(f, "new"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("Preimage mismatch: {side} preimages do not hash to the claimed value hash.")]
    PreimageMismatch { side: CommitmentSide },
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("Invalid external state: {0}")]
    InvalidExternalState(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl KeystoreError {
    /// Stable name of the error kind, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            KeystoreError::PreimageMismatch { .. } => "PreimageMismatch",
            KeystoreError::AuthorizationDenied(_) => "AuthorizationDenied",
            KeystoreError::InvalidExternalState(_) => "InvalidExternalState",
            KeystoreError::MalformedInput(_) => "MalformedInput",
            KeystoreError::Storage(_) => "Storage",
        }
    }
}
