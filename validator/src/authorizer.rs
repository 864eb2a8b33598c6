use crate::block_validation::ValidateBlock;
use crate::controller::Authorize;
use log::debug;
use state::block::{ExternalState, ExternalStateRef};
use state::commitment::{CommitmentScheme, Sha256Commitment};
use state::error::{CommitmentSide, KeystoreError};
use state::keystore_record::ValueHash;
use state::update::{authorization_digest, UpdateRequest};

/// Decides whether a record may move from `effective_current` to the request's new value hash.
/// Implementations must not touch storage.
pub trait VerifyUpdate {
    fn verify(&self, request: &UpdateRequest, effective_current: &ValueHash) -> Result<(), KeystoreError>;
}

/// Checks run in order:
/// 1. current preimages reproduce `effective_current`
/// 2. new preimages reproduce the new value hash
/// 3. external block data, when supplied, is validated
/// 4. the current controller approves the proofs
#[derive(Debug)]
pub struct UpdateAuthorizer<V: ValidateBlock, C: CommitmentScheme = Sha256Commitment> {
    block_validator: V,
    commitment: C,
}

impl<V: ValidateBlock> UpdateAuthorizer<V, Sha256Commitment> {
    pub fn new(block_validator: V) -> Self {
        Self::with_commitment(block_validator, Sha256Commitment)
    }
}

impl<V: ValidateBlock, C: CommitmentScheme> UpdateAuthorizer<V, C> {
    pub fn with_commitment(block_validator: V, commitment: C) -> Self {
        Self { block_validator, commitment }
    }

    pub fn block_validator(&self) -> &V {
        &self.block_validator
    }

    pub fn validate_external_state(&self, reference: &ExternalStateRef) -> Result<ExternalState, KeystoreError> {
        match reference {
            ExternalStateRef::Absent => Ok(ExternalState::Absent),
            ExternalStateRef::Present(data) => self.block_validator.validate(data).map(ExternalState::Present),
        }
    }
}

impl<V: ValidateBlock, C: CommitmentScheme> VerifyUpdate for UpdateAuthorizer<V, C> {
    fn verify(&self, request: &UpdateRequest, effective_current: &ValueHash) -> Result<(), KeystoreError> {
        if self.commitment.value_hash(&request.current_preimages) != *effective_current {
            return Err(KeystoreError::PreimageMismatch { side: CommitmentSide::Current });
        }
        if self.commitment.value_hash(&request.new_preimages) != request.new_value_hash {
            return Err(KeystoreError::PreimageMismatch { side: CommitmentSide::New });
        }

        let external_state = self.validate_external_state(&request.l1_block_data)?;
        let digest = authorization_digest(
            &request.id,
            effective_current,
            &request.new_value_hash,
            external_state.block(),
        );

        request
            .current_preimages
            .controller
            .authorize(&digest, &request.controller_proofs, &external_state)?;

        debug!(
            "Authorized {} -> {} for id {}",
            effective_current, request.new_value_hash, request.id
        );
        Ok(())
    }
}
