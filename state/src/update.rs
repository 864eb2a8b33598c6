use crate::block::{ExternalStateRef, ValidatedBlock};
use crate::keystore_record::{Address, Id, ValueHash};
use crate::preimages::ValueHashPreimages;
use crate::proofs::ControllerProofs;
use sha2::{Digest, Sha256};

const AUTHORIZATION_DOMAIN: &[u8] = b"keystore/authorize/v1";

/// Arguments of a single update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub id: Id,
    pub account: Address,
    pub current_preimages: ValueHashPreimages,
    pub new_value_hash: ValueHash,
    pub new_preimages: ValueHashPreimages,
    pub l1_block_data: ExternalStateRef,
    pub controller_proofs: ControllerProofs,
}

/// Emitted once for every committed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordUpdated {
    pub id: Id,
    pub account: Address,
    pub new_value_hash: ValueHash,
}

/// Message controllers sign to approve moving `id` from `current` to `new`.
///
/// When an external block is involved its hash is bound into the message, so a proof produced
/// for one block cannot be replayed against another.
pub fn authorization_digest(
    id: &Id,
    current: &ValueHash,
    new: &ValueHash,
    block: Option<&ValidatedBlock>,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(AUTHORIZATION_DOMAIN);
    hasher.update(id.0);
    hasher.update(current.0);
    hasher.update(new.0);
    match block {
        None => hasher.update([0u8]),
        Some(block) => {
            hasher.update([1u8]);
            hasher.update(block.hash);
        }
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::BlockHeader;

    #[test]
    fn digest_binds_every_input() {
        let id = Id([1; 32]);
        let current = ValueHash([2; 32]);
        let new = ValueHash([3; 32]);
        let base = authorization_digest(&id, &current, &new, None);

        assert_ne!(base, authorization_digest(&Id([9; 32]), &current, &new, None));
        assert_ne!(base, authorization_digest(&id, &ValueHash([9; 32]), &new, None));
        assert_ne!(base, authorization_digest(&id, &current, &ValueHash([9; 32]), None));

        let header = BlockHeader { parent_hash: [0; 32], number: 1, timestamp: 0, state_root: [0; 32] };
        let block = ValidatedBlock { hash: header.hash(), header };
        assert_ne!(base, authorization_digest(&id, &current, &new, Some(&block)));
    }
}
