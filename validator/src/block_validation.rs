use log::debug;
use state::block::{BlockHashProof, BlockHeader, L1BlockData, ValidatedBlock};
use state::error::KeystoreError;
use std::collections::HashSet;
use std::sync::RwLock;

/// Deeper proofs than this are refused before any hashing is done.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Source of truth for which block-hash roots may be trusted.
pub trait BlockAnchor {
    fn is_trusted_root(&self, root: &[u8; 32]) -> bool;
}

/// In-memory set of trusted roots, typically seeded from configuration.
#[derive(Debug, Default)]
pub struct TrustedRoots {
    roots: RwLock<HashSet<[u8; 32]>>,
}

impl TrustedRoots {
    pub fn new(roots: impl IntoIterator<Item = [u8; 32]>) -> Self {
        Self {
            roots: RwLock::new(roots.into_iter().collect()),
        }
    }

    pub fn add_root(&self, root: [u8; 32]) {
        self.roots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(root);
    }

    pub fn len(&self) -> usize {
        self.roots.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlockAnchor for TrustedRoots {
    fn is_trusted_root(&self, root: &[u8; 32]) -> bool {
        self.roots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(root)
    }
}

/// Turns caller supplied block data into a [`ValidatedBlock`] or refuses it.
pub trait ValidateBlock {
    fn validate(&self, data: &L1BlockData) -> Result<ValidatedBlock, KeystoreError>;
}

/// Accepts a header when a Merkle proof carries its hash up to a root the anchor trusts.
#[derive(Debug)]
pub struct AnchoredBlockValidator<A: BlockAnchor> {
    anchor: A,
}

impl<A: BlockAnchor> AnchoredBlockValidator<A> {
    pub fn new(anchor: A) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> &A {
        &self.anchor
    }
}

impl<A: BlockAnchor> ValidateBlock for AnchoredBlockValidator<A> {
    fn validate(&self, data: &L1BlockData) -> Result<ValidatedBlock, KeystoreError> {
        let header = BlockHeader::decode(&data.block_header)?;
        let hash = header.hash();
        let BlockHashProof { root, proof } = &data.block_hash_proof;

        if proof.leaf_hash != hash {
            return Err(KeystoreError::InvalidExternalState(
                "block hash proof is for a different block".to_string(),
            ));
        }
        if proof.depth() > MAX_PROOF_DEPTH {
            return Err(KeystoreError::InvalidExternalState(format!(
                "block hash proof depth {} exceeds {}",
                proof.depth(),
                MAX_PROOF_DEPTH
            )));
        }
        if !self.anchor.is_trusted_root(root) {
            return Err(KeystoreError::InvalidExternalState(
                "block hash proof root is not trusted".to_string(),
            ));
        }
        if !proof.verify(root) {
            return Err(KeystoreError::InvalidExternalState(
                "block hash proof does not reach its root".to_string(),
            ));
        }

        debug!("Validated external block {} ({:?})", header.number, hash);
        Ok(ValidatedBlock { header, hash })
    }
}
