use crate::merkle_proof::{hash_nodes, MerkleProof};
use borsh::{to_vec, BorshSerialize};
use sha2::{Digest, Sha256};
use std::io;

/// Binary Merkle tree over 32-byte leaf hashes.
///
/// Levels are kept bottom-up so proofs can be read off directly. An odd node at the end of a
/// level is paired with itself.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn new(leaves: Vec<[u8; 32]>) -> Self {
        let mut tree = MerkleTree { levels: vec![] };
        tree.rebuild(leaves);
        tree
    }

    /// Build a tree whose leaves are the sha256 of each record's borsh encoding.
    pub fn from_records<T: BorshSerialize>(records: &[T]) -> io::Result<Self> {
        let leaves = records
            .iter()
            .map(|record| to_vec(record).map(|bytes| Sha256::digest(bytes).into()))
            .collect::<io::Result<Vec<[u8; 32]>>>()?;
        Ok(Self::new(leaves))
    }

    fn rebuild(&mut self, leaves: Vec<[u8; 32]>) {
        self.levels.clear();
        if leaves.is_empty() {
            return;
        }

        self.levels.push(leaves);
        while let Some(level) = self.levels.last() {
            if level.len() == 1 {
                break;
            }
            let parents = level
                .chunks(2)
                .map(|chunk| {
                    let left = &chunk[0];
                    let right = chunk.get(1).unwrap_or(left);
                    hash_nodes(left, right)
                })
                .collect();
            self.levels.push(parents);
        }
    }

    pub fn root_hash(&self) -> Option<[u8; 32]> {
        self.levels.last().and_then(|level| level.first().copied())
    }

    pub fn generate_proof(&self, index: usize) -> Option<MerkleProof> {
        let leaf_hash = *self.levels.first()?.get(index)?;
        let mut sibling_hashes = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let proof_step = if idx % 2 == 0 {
                // Right sibling, or ourselves when we are the odd node out
                (*level.get(idx + 1).unwrap_or(&level[idx]), true)
            } else {
                (level[idx - 1], false)
            };
            sibling_hashes.push(proof_step);
            idx /= 2;
        }

        Some(MerkleProof::new(leaf_hash, sibling_hashes))
    }
}
