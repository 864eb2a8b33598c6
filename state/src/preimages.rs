use borsh::{BorshDeserialize, BorshSerialize};

/// Compressed secp256k1 public key.
pub type PublicKeyBytes = [u8; 33];

/// Single-key controller: one ECDSA signature over the authorization digest.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Secp256k1Controller {
    pub public_key: PublicKeyBytes,
}

/// M-of-N controller.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MultisigController {
    pub threshold: u8,
    pub public_keys: Vec<PublicKeyBytes>,
}

/// Single-key controller that only acts once the external chain has reached
/// `min_block_number`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockGatedController {
    pub public_key: PublicKeyBytes,
    pub min_block_number: u64,
}

/// The policy that decides whether a record may move away from its current value hash.
/// The borsh variant index is the controller-type discriminant.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Controller {
    Secp256k1(Secp256k1Controller),
    Multisig(MultisigController),
    BlockGated(BlockGatedController),
}

impl Controller {
    pub fn name(&self) -> &'static str {
        match self {
            Controller::Secp256k1(_) => "secp256k1",
            Controller::Multisig(_) => "multisig",
            Controller::BlockGated(_) => "block-gated",
        }
    }
}

/// Everything a [`crate::keystore_record::ValueHash`] commits to.
///
/// Never persisted; callers reveal it whenever they need to justify a value hash.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ValueHashPreimages {
    pub controller: Controller,
    /// Commitment to account data the controller does not interpret.
    pub storage_hash: [u8; 32],
}

impl ValueHashPreimages {
    pub fn new(controller: Controller, storage_hash: [u8; 32]) -> Self {
        Self { controller, storage_hash }
    }
}
