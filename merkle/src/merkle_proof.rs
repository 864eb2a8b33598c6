use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

/// Prefix for internal nodes so a pair of child hashes can never be replayed as a leaf.
const NODE_PREFIX: [u8; 1] = [0x01];

/// Hash two child nodes into their parent.
/// node_hash = sha256(0x01 || left || right)
pub fn hash_nodes(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(NODE_PREFIX);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Inclusion proof for a single leaf hash.
///
/// `sibling_hashes` runs from the leaf level upwards. The flag is `true` when the sibling sits
/// on the right of the running hash.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MerkleProof {
    pub leaf_hash: [u8; 32],
    pub sibling_hashes: Vec<([u8; 32], bool)>, // (sibling_hash, is_right_sibling)
}

impl MerkleProof {
    pub fn new(leaf_hash: [u8; 32], sibling_hashes: Vec<([u8; 32], bool)>) -> Self {
        Self { leaf_hash, sibling_hashes }
    }

    pub fn depth(&self) -> usize {
        self.sibling_hashes.len()
    }

    /// Fold the leaf up through its siblings and compare against `root_hash`.
    pub fn root(&self) -> [u8; 32] {
        let mut computed_hash = self.leaf_hash;

        for (sibling_hash, is_right_sibling) in &self.sibling_hashes {
            computed_hash = if *is_right_sibling {
                hash_nodes(&computed_hash, sibling_hash)
            } else {
                hash_nodes(sibling_hash, &computed_hash)
            };
        }

        computed_hash
    }

    pub fn verify(&self, root_hash: &[u8; 32]) -> bool {
        &self.root() == root_hash
    }
}
