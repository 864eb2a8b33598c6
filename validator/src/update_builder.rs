use crate::signature::sign_digest;
use state::block::{BlockHeader, ExternalStateRef, L1BlockData, ValidatedBlock};
use state::commitment::{CommitmentScheme, Sha256Commitment};
use state::error::KeystoreError;
use state::keystore_record::{Address, Id, ValueHash};
use state::preimages::ValueHashPreimages;
use state::proofs::{ControllerProofs, IndexedSignature};
use state::update::{authorization_digest, UpdateRequest};

/// Client side helper that assembles and signs an [`UpdateRequest`].
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    id: Id,
    account: Address,
    current_preimages: ValueHashPreimages,
    new_preimages: ValueHashPreimages,
    new_value_hash: ValueHash,
    l1_block_data: ExternalStateRef,
}

impl UpdateBuilder {
    pub fn new(
        id: Id,
        account: Address,
        current_preimages: ValueHashPreimages,
        new_preimages: ValueHashPreimages,
    ) -> Self {
        let new_value_hash = Sha256Commitment.value_hash(&new_preimages);
        Self {
            id,
            account,
            current_preimages,
            new_preimages,
            new_value_hash,
            l1_block_data: ExternalStateRef::Absent,
        }
    }

    pub fn with_block(mut self, data: L1BlockData) -> Self {
        self.l1_block_data = ExternalStateRef::Present(data);
        self
    }

    pub fn new_value_hash(&self) -> ValueHash {
        self.new_value_hash
    }

    /// The digest the current controller has to sign. `effective_current` is the stored
    /// value hash, or the id itself for a record that was never written.
    pub fn digest(&self, effective_current: &ValueHash) -> Result<[u8; 32], KeystoreError> {
        let block = match &self.l1_block_data {
            ExternalStateRef::Absent => None,
            ExternalStateRef::Present(data) => {
                let header = BlockHeader::decode(&data.block_header)?;
                Some(ValidatedBlock { hash: header.hash(), header })
            }
        };
        Ok(authorization_digest(
            &self.id,
            effective_current,
            &self.new_value_hash,
            block.as_ref(),
        ))
    }

    pub fn with_proofs(self, controller_proofs: ControllerProofs) -> UpdateRequest {
        UpdateRequest {
            id: self.id,
            account: self.account,
            current_preimages: self.current_preimages,
            new_value_hash: self.new_value_hash,
            new_preimages: self.new_preimages,
            l1_block_data: self.l1_block_data,
            controller_proofs,
        }
    }

    pub fn sign(self, effective_current: &ValueHash, secret_key: &[u8; 32]) -> Result<UpdateRequest, KeystoreError> {
        let signature = sign_digest(&self.digest(effective_current)?, secret_key)?;
        Ok(self.with_proofs(ControllerProofs::Signature(signature)))
    }

    pub fn multisign(
        self,
        effective_current: &ValueHash,
        signers: &[(u8, [u8; 32])],
    ) -> Result<UpdateRequest, KeystoreError> {
        let digest = self.digest(effective_current)?;
        let signatures = signers
            .iter()
            .map(|(signer_index, secret_key)| {
                sign_digest(&digest, secret_key).map(|signature| IndexedSignature {
                    signer_index: *signer_index,
                    signature,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_proofs(ControllerProofs::Multisig(signatures)))
    }
}
