use crate::signature::verify_digest;
use log::debug;
use state::block::ExternalState;
use state::error::KeystoreError;
use state::preimages::{BlockGatedController, Controller, MultisigController, Secp256k1Controller};
use state::proofs::ControllerProofs;
use std::collections::BTreeSet;

/// Capability every controller exposes: approve or reject a transition given the signed
/// digest, the caller's proofs and the already validated external state.
pub trait Authorize {
    fn authorize(
        &self,
        digest: &[u8; 32],
        proofs: &ControllerProofs,
        external_state: &ExternalState,
    ) -> Result<(), KeystoreError>;
}

fn expect_signature<'a>(controller: &str, proofs: &'a ControllerProofs) -> Result<&'a [u8; 64], KeystoreError> {
    match proofs {
        ControllerProofs::Signature(signature) => Ok(signature),
        ControllerProofs::Multisig(_) => Err(KeystoreError::MalformedInput(format!(
            "{} controller expects a single signature proof",
            controller
        ))),
    }
}

impl Authorize for Secp256k1Controller {
    fn authorize(
        &self,
        digest: &[u8; 32],
        proofs: &ControllerProofs,
        _external_state: &ExternalState,
    ) -> Result<(), KeystoreError> {
        let signature = expect_signature("secp256k1", proofs)?;
        if verify_digest(digest, signature, &self.public_key)? {
            Ok(())
        } else {
            Err(KeystoreError::AuthorizationDenied(
                "signature does not match the controller key".to_string(),
            ))
        }
    }
}

impl Authorize for MultisigController {
    fn authorize(
        &self,
        digest: &[u8; 32],
        proofs: &ControllerProofs,
        _external_state: &ExternalState,
    ) -> Result<(), KeystoreError> {
        let threshold = self.threshold as usize;
        if threshold == 0 || threshold > self.public_keys.len() {
            return Err(KeystoreError::MalformedInput(format!(
                "multisig threshold {} is invalid for {} keys",
                self.threshold,
                self.public_keys.len()
            )));
        }

        let signatures = match proofs {
            ControllerProofs::Multisig(signatures) => signatures,
            ControllerProofs::Signature(_) => {
                return Err(KeystoreError::MalformedInput(
                    "multisig controller expects indexed signatures".to_string(),
                ))
            }
        };

        let mut approved = BTreeSet::new();
        for indexed in signatures {
            let public_key = self
                .public_keys
                .get(indexed.signer_index as usize)
                .ok_or_else(|| {
                    KeystoreError::MalformedInput(format!(
                        "signer index {} is out of range",
                        indexed.signer_index
                    ))
                })?;
            // The same key listed twice still counts as one signer
            if verify_digest(digest, &indexed.signature, public_key)? {
                approved.insert(*public_key);
            } else {
                debug!("Multisig signer {} did not sign this digest", indexed.signer_index);
            }
        }

        if approved.len() >= threshold {
            Ok(())
        } else {
            Err(KeystoreError::AuthorizationDenied(format!(
                "{} of {} required signers approved",
                approved.len(),
                threshold
            )))
        }
    }
}

impl Authorize for BlockGatedController {
    fn authorize(
        &self,
        digest: &[u8; 32],
        proofs: &ControllerProofs,
        external_state: &ExternalState,
    ) -> Result<(), KeystoreError> {
        let block = external_state.block().ok_or_else(|| {
            KeystoreError::AuthorizationDenied("controller requires an external block".to_string())
        })?;
        if block.header.number < self.min_block_number {
            return Err(KeystoreError::AuthorizationDenied(format!(
                "external block {} is before required block {}",
                block.header.number, self.min_block_number
            )));
        }

        let signature = expect_signature("block-gated", proofs)?;
        if verify_digest(digest, signature, &self.public_key)? {
            Ok(())
        } else {
            Err(KeystoreError::AuthorizationDenied(
                "signature does not match the controller key".to_string(),
            ))
        }
    }
}

impl Authorize for Controller {
    fn authorize(
        &self,
        digest: &[u8; 32],
        proofs: &ControllerProofs,
        external_state: &ExternalState,
    ) -> Result<(), KeystoreError> {
        debug!("Dispatching authorization to {} controller", self.name());
        match self {
            Controller::Secp256k1(controller) => controller.authorize(digest, proofs, external_state),
            Controller::Multisig(controller) => controller.authorize(digest, proofs, external_state),
            Controller::BlockGated(controller) => controller.authorize(digest, proofs, external_state),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signature::{public_key_for, sign_digest};
    use state::block::{BlockHeader, ValidatedBlock};
    use state::proofs::IndexedSignature;

    const DIGEST: [u8; 32] = [0x5A; 32];

    fn block(number: u64) -> ExternalState {
        let header = BlockHeader { parent_hash: [0; 32], number, timestamp: 0, state_root: [0; 32] };
        ExternalState::Present(ValidatedBlock { hash: header.hash(), header })
    }

    fn multisig(threshold: u8) -> MultisigController {
        MultisigController {
            threshold,
            public_keys: (1..=3u8).map(|n| public_key_for(&[n; 32]).unwrap()).collect(),
        }
    }

    fn signed_by(signer_index: u8) -> IndexedSignature {
        IndexedSignature {
            signer_index,
            signature: sign_digest(&DIGEST, &[signer_index + 1; 32]).unwrap(),
        }
    }

    #[test]
    fn single_key_controller() {
        let controller = Controller::Secp256k1(Secp256k1Controller { public_key: public_key_for(&[1; 32]).unwrap() });
        let good = ControllerProofs::Signature(sign_digest(&DIGEST, &[1; 32]).unwrap());
        let bad = ControllerProofs::Signature(sign_digest(&DIGEST, &[2; 32]).unwrap());

        assert_eq!(controller.authorize(&DIGEST, &good, &ExternalState::Absent), Ok(()));
        assert!(matches!(
            controller.authorize(&DIGEST, &bad, &ExternalState::Absent),
            Err(KeystoreError::AuthorizationDenied(_))
        ));
    }

    #[test]
    fn mismatched_proof_kind_is_malformed() {
        let controller = Controller::Secp256k1(Secp256k1Controller { public_key: public_key_for(&[1; 32]).unwrap() });
        let err = controller
            .authorize(&DIGEST, &ControllerProofs::Multisig(vec![]), &ExternalState::Absent)
            .unwrap_err();
        assert!(matches!(err, KeystoreError::MalformedInput(_)));
    }

    #[test]
    fn multisig_meets_threshold() {
        let controller = multisig(2);
        let proofs = ControllerProofs::Multisig(vec![signed_by(0), signed_by(2)]);
        assert_eq!(controller.authorize(&DIGEST, &proofs, &ExternalState::Absent), Ok(()));
    }

    #[test]
    fn multisig_counts_duplicate_signers_once() {
        let controller = multisig(2);
        let proofs = ControllerProofs::Multisig(vec![signed_by(1), signed_by(1)]);
        assert!(matches!(
            controller.authorize(&DIGEST, &proofs, &ExternalState::Absent),
            Err(KeystoreError::AuthorizationDenied(_))
        ));
    }

    #[test]
    fn multisig_counts_repeated_key_once() {
        let repeated = public_key_for(&[1; 32]).unwrap();
        let controller = MultisigController {
            threshold: 2,
            public_keys: vec![repeated, repeated, public_key_for(&[2; 32]).unwrap()],
        };
        let signature = sign_digest(&DIGEST, &[1; 32]).unwrap();
        let proofs = ControllerProofs::Multisig(vec![
            IndexedSignature { signer_index: 0, signature },
            IndexedSignature { signer_index: 1, signature },
        ]);
        assert!(matches!(
            controller.authorize(&DIGEST, &proofs, &ExternalState::Absent),
            Err(KeystoreError::AuthorizationDenied(_))
        ));

        let proofs = ControllerProofs::Multisig(vec![
            IndexedSignature { signer_index: 1, signature },
            IndexedSignature { signer_index: 2, signature: sign_digest(&DIGEST, &[2; 32]).unwrap() },
        ]);
        assert_eq!(controller.authorize(&DIGEST, &proofs, &ExternalState::Absent), Ok(()));
    }

    #[test]
    fn multisig_ignores_signature_under_wrong_slot() {
        let controller = multisig(2);
        let mut misplaced = signed_by(0);
        misplaced.signer_index = 1;
        let proofs = ControllerProofs::Multisig(vec![signed_by(0), misplaced]);
        assert!(matches!(
            controller.authorize(&DIGEST, &proofs, &ExternalState::Absent),
            Err(KeystoreError::AuthorizationDenied(_))
        ));
    }

    #[test]
    fn multisig_rejects_out_of_range_signer() {
        let controller = multisig(1);
        let mut stray = signed_by(0);
        stray.signer_index = 7;
        let err = controller
            .authorize(&DIGEST, &ControllerProofs::Multisig(vec![stray]), &ExternalState::Absent)
            .unwrap_err();
        assert!(matches!(err, KeystoreError::MalformedInput(_)));
    }

    #[test]
    fn multisig_rejects_unusable_threshold() {
        let proofs = ControllerProofs::Multisig(vec![signed_by(0)]);
        for threshold in [0u8, 4u8] {
            let err = multisig(threshold).authorize(&DIGEST, &proofs, &ExternalState::Absent).unwrap_err();
            assert!(matches!(err, KeystoreError::MalformedInput(_)));
        }
    }

    #[test]
    fn block_gated_controller_needs_recent_block() {
        let controller = BlockGatedController {
            public_key: public_key_for(&[1; 32]).unwrap(),
            min_block_number: 100,
        };
        let proofs = ControllerProofs::Signature(sign_digest(&DIGEST, &[1; 32]).unwrap());

        assert!(matches!(
            controller.authorize(&DIGEST, &proofs, &ExternalState::Absent),
            Err(KeystoreError::AuthorizationDenied(_))
        ));
        assert!(matches!(
            controller.authorize(&DIGEST, &proofs, &block(99)),
            Err(KeystoreError::AuthorizationDenied(_))
        ));
        assert_eq!(controller.authorize(&DIGEST, &proofs, &block(100)), Ok(()));
    }
}
