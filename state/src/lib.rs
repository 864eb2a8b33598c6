pub mod block;
pub mod commitment;
pub mod config;
pub mod error;
pub mod keystore_record;
pub mod preimages;
pub mod proofs;
pub mod state_record;
pub mod update;
