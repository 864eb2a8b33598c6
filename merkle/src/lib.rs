pub mod merkle_proof;
pub mod merkle_tree;

pub use merkle_proof::MerkleProof;
pub use merkle_tree::MerkleTree;
