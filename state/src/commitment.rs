use crate::keystore_record::ValueHash;
use crate::preimages::ValueHashPreimages;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};

const VALUE_HASH_DOMAIN: &[u8] = b"keystore/value-hash/v1";

/// One-way function from preimages to the value hash stored for a record.
pub trait CommitmentScheme {
    fn value_hash(&self, preimages: &ValueHashPreimages) -> ValueHash;
}

/// `sha256(domain || borsh(preimages))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Commitment;

impl CommitmentScheme for Sha256Commitment {
    fn value_hash(&self, preimages: &ValueHashPreimages) -> ValueHash {
        let mut hasher = Sha256::new();
        hasher.update(VALUE_HASH_DOMAIN);
        // Writing into a hasher cannot fail
        let _ = preimages.serialize(&mut hasher);
        ValueHash(hasher.finalize().into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::preimages::{Controller, MultisigController, Secp256k1Controller};

    fn preimages(key: u8) -> ValueHashPreimages {
        ValueHashPreimages::new(
            Controller::Secp256k1(Secp256k1Controller { public_key: [key; 33] }),
            [0; 32],
        )
    }

    #[test]
    fn value_hash_is_deterministic() {
        let scheme = Sha256Commitment;
        assert_eq!(scheme.value_hash(&preimages(2)), scheme.value_hash(&preimages(2)));
        assert!(!scheme.value_hash(&preimages(2)).is_zero());
    }

    #[test]
    fn value_hash_covers_controller_and_storage() {
        let scheme = Sha256Commitment;
        assert_ne!(scheme.value_hash(&preimages(2)), scheme.value_hash(&preimages(3)));

        let mut with_storage = preimages(2);
        with_storage.storage_hash = [9; 32];
        assert_ne!(scheme.value_hash(&preimages(2)), scheme.value_hash(&with_storage));
    }

    #[test]
    fn controller_type_is_committed() {
        let scheme = Sha256Commitment;
        let single = ValueHashPreimages::new(
            Controller::Secp256k1(Secp256k1Controller { public_key: [2; 33] }),
            [0; 32],
        );
        let multi = ValueHashPreimages::new(
            Controller::Multisig(MultisigController { threshold: 1, public_keys: vec![[2; 33]] }),
            [0; 32],
        );
        assert_ne!(scheme.value_hash(&single), scheme.value_hash(&multi));
    }
}
