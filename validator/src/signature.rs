use libsecp256k1::{Message, PublicKey, SecretKey, Signature};
use state::error::KeystoreError;
use state::preimages::PublicKeyBytes;
use state::proofs::SignatureBytes;

pub fn parse_public_key(public_key: &PublicKeyBytes) -> Result<PublicKey, KeystoreError> {
    PublicKey::parse_compressed(public_key)
        .map_err(|err| KeystoreError::MalformedInput(format!("invalid controller public key: {:?}", err)))
}

pub fn parse_signature(signature: &SignatureBytes) -> Result<Signature, KeystoreError> {
    Signature::parse_standard(signature)
        .map_err(|err| KeystoreError::MalformedInput(format!("invalid signature encoding: {:?}", err)))
}

/// Check a compact signature over `digest` against a compressed public key.
///
/// Encoding problems are `MalformedInput`; a well-formed signature by the wrong key yields
/// `Ok(false)`.
pub fn verify_digest(
    digest: &[u8; 32],
    signature: &SignatureBytes,
    public_key: &PublicKeyBytes,
) -> Result<bool, KeystoreError> {
    let public_key = parse_public_key(public_key)?;
    let signature = parse_signature(signature)?;
    Ok(libsecp256k1::verify(&Message::parse(digest), &signature, &public_key))
}

/// Sign `digest` with a raw secret key, returning the compact 64-byte signature.
pub fn sign_digest(digest: &[u8; 32], secret_key: &[u8; 32]) -> Result<SignatureBytes, KeystoreError> {
    let secret_key = SecretKey::parse(secret_key)
        .map_err(|err| KeystoreError::MalformedInput(format!("invalid secret key: {:?}", err)))?;
    let (signature, _recovery_id) = libsecp256k1::sign(&Message::parse(digest), &secret_key);
    Ok(signature.serialize())
}

pub fn public_key_for(secret_key: &[u8; 32]) -> Result<PublicKeyBytes, KeystoreError> {
    let secret_key = SecretKey::parse(secret_key)
        .map_err(|err| KeystoreError::MalformedInput(format!("invalid secret key: {:?}", err)))?;
    Ok(PublicKey::from_secret_key(&secret_key).serialize_compressed())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let secret = [7u8; 32];
        let digest = [1u8; 32];
        let public_key = public_key_for(&secret).unwrap();
        let signature = sign_digest(&digest, &secret).unwrap();

        assert!(verify_digest(&digest, &signature, &public_key).unwrap());
        assert!(!verify_digest(&[2u8; 32], &signature, &public_key).unwrap());
    }

    #[test]
    fn wrong_key_is_not_malformed() {
        let digest = [1u8; 32];
        let signature = sign_digest(&digest, &[7u8; 32]).unwrap();
        let other = public_key_for(&[8u8; 32]).unwrap();
        assert_eq!(verify_digest(&digest, &signature, &other), Ok(false));
    }

    #[test]
    fn garbage_public_key_is_malformed() {
        let signature = sign_digest(&[1u8; 32], &[7u8; 32]).unwrap();
        let err = verify_digest(&[1u8; 32], &signature, &[0u8; 33]).unwrap_err();
        assert!(matches!(err, KeystoreError::MalformedInput(_)));
    }

    #[test]
    fn zero_secret_key_is_rejected() {
        assert!(sign_digest(&[1u8; 32], &[0u8; 32]).is_err());
    }
}
