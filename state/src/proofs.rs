use borsh::{BorshDeserialize, BorshSerialize};

/// Compact (r || s) ECDSA signature.
pub type SignatureBytes = [u8; 64];

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct IndexedSignature {
    /// Position of the signer in the controller's key list.
    pub signer_index: u8,
    pub signature: SignatureBytes,
}

/// Proof material handed to the current controller.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ControllerProofs {
    Signature(SignatureBytes),
    Multisig(Vec<IndexedSignature>),
}
