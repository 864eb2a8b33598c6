use crate::error::KeystoreError;
use borsh::{from_slice, to_vec, BorshDeserialize, BorshSerialize};
use merkle::MerkleProof;
use sha2::{Digest, Sha256};
use std::io;

/// Header of a block on the external chain.
///
/// The block hash is the sha256 of the header's borsh encoding.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockHeader {
    pub parent_hash: [u8; 32],
    pub number: u64,
    pub timestamp: u64,
    pub state_root: [u8; 32],
}

impl BlockHeader {
    pub fn hash(&self) -> [u8; 32] {
        // Same byte layout as the borsh encoding
        let mut hasher = Sha256::new();
        hasher.update(self.parent_hash);
        hasher.update(self.number.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.state_root);
        hasher.finalize().into()
    }

    pub fn encode(&self) -> io::Result<Vec<u8>> {
        to_vec(self)
    }

    /// Decode header bytes, rejecting anything that is not exactly one header.
    pub fn decode(bytes: &[u8]) -> Result<Self, KeystoreError> {
        from_slice::<BlockHeader>(bytes)
            .map_err(|err| KeystoreError::InvalidExternalState(format!("malformed block header: {}", err)))
    }
}

/// Proof that a block hash is included under a root the verifier trusts.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockHashProof {
    pub root: [u8; 32],
    pub proof: MerkleProof,
}

/// Wire form of an external state reference: `encode(block_header, block_hash_proof)`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct L1BlockData {
    pub block_header: Vec<u8>,
    pub block_hash_proof: BlockHashProof,
}

impl L1BlockData {
    pub fn new(header: &BlockHeader, block_hash_proof: BlockHashProof) -> io::Result<Self> {
        Ok(Self {
            block_header: header.encode()?,
            block_hash_proof,
        })
    }
}

/// External state as supplied by a caller, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExternalStateRef {
    #[default]
    Absent,
    Present(L1BlockData),
}

impl ExternalStateRef {
    /// Empty bytes mean no external state was supplied.
    pub fn decode(bytes: &[u8]) -> Result<Self, KeystoreError> {
        if bytes.is_empty() {
            return Ok(ExternalStateRef::Absent);
        }
        from_slice::<L1BlockData>(bytes)
            .map(ExternalStateRef::Present)
            .map_err(|err| KeystoreError::InvalidExternalState(format!("malformed l1 block data: {}", err)))
    }

    pub fn encode(&self) -> io::Result<Vec<u8>> {
        match self {
            ExternalStateRef::Absent => Ok(vec![]),
            ExternalStateRef::Present(data) => to_vec(data),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ExternalStateRef::Present(_))
    }
}

/// A header whose authenticity has been established against a trusted anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBlock {
    pub header: BlockHeader,
    pub hash: [u8; 32],
}

/// External state as seen by controllers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExternalState {
    #[default]
    Absent,
    Present(ValidatedBlock),
}

impl ExternalState {
    pub fn block(&self) -> Option<&ValidatedBlock> {
        match self {
            ExternalState::Absent => None,
            ExternalState::Present(block) => Some(block),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn header() -> BlockHeader {
        BlockHeader {
            parent_hash: [1; 32],
            number: 42,
            timestamp: 1_700_000_000,
            state_root: [2; 32],
        }
    }

    #[test]
    fn hash_matches_hash_of_encoding() {
        let header = header();
        let encoded = header.encode().unwrap();
        let expected: [u8; 32] = Sha256::digest(&encoded).into();
        assert_eq!(header.hash(), expected);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut encoded = header().encode().unwrap();
        encoded.push(0);
        let err = BlockHeader::decode(&encoded).unwrap_err();
        assert!(matches!(err, KeystoreError::InvalidExternalState(_)));
    }

    #[test]
    fn empty_reference_is_absent() {
        assert_eq!(ExternalStateRef::decode(&[]).unwrap(), ExternalStateRef::Absent);
        assert!(ExternalStateRef::Absent.encode().unwrap().is_empty());
    }

    #[test]
    fn present_reference_decodes_back() {
        let proof = BlockHashProof {
            root: header().hash(),
            proof: MerkleProof::new(header().hash(), vec![]),
        };
        let reference = ExternalStateRef::Present(L1BlockData::new(&header(), proof).unwrap());
        let bytes = reference.encode().unwrap();
        assert_eq!(ExternalStateRef::decode(&bytes).unwrap(), reference);
    }

    #[test]
    fn garbage_reference_is_invalid_external_state() {
        let err = ExternalStateRef::decode(&[0xFF, 0x01]).unwrap_err();
        assert!(matches!(err, KeystoreError::InvalidExternalState(_)));
    }
}
