//! ECDSA signature checks using secp256k1

use crate::CryptoError;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as K256Signature, VerifyingKey};
use scriptdbg_primitives::H256;

/// Public key (33 bytes compressed or 65 bytes uncompressed SEC1)
pub type PublicKey = VerifyingKey;

/// Verify a DER-encoded signature over a message hash.
///
/// `der_sig` must not carry the trailing sighash byte; the caller strips it.
/// High-s signatures are normalized before verification, script validation
/// only cares whether the signature is mathematically valid.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and
/// `Err` when either the key or the signature cannot be decoded.
pub fn verify_der(
    message_hash: &H256,
    der_sig: &[u8],
    public_key: &[u8],
) -> Result<bool, CryptoError> {
    let key = PublicKey::from_sec1_bytes(public_key)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let sig = K256Signature::from_der(der_sig)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let sig = sig.normalize_s().unwrap_or(sig);

    Ok(key.verify_prehash(message_hash.as_bytes(), &sig).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sha256;
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    fn sign_der(key: &SigningKey, hash: &H256) -> Vec<u8> {
        let (sig, _recid) = key.sign_prehash_recoverable(hash.as_bytes()).unwrap();
        sig.to_der().as_bytes().to_vec()
    }

    #[test]
    fn test_verify_valid_signature() {
        let key = SigningKey::random(&mut OsRng);
        let pubkey = key.verifying_key().to_encoded_point(true);
        let hash = sha256(b"spend");

        let sig = sign_der(&key, &hash);
        assert_eq!(verify_der(&hash, &sig, pubkey.as_bytes()), Ok(true));
    }

    #[test]
    fn test_verify_uncompressed_key() {
        let key = SigningKey::random(&mut OsRng);
        let pubkey = key.verifying_key().to_encoded_point(false);
        let hash = sha256(b"spend");

        let sig = sign_der(&key, &hash);
        assert_eq!(verify_der(&hash, &sig, pubkey.as_bytes()), Ok(true));
    }

    #[test]
    fn test_verify_wrong_message() {
        let key = SigningKey::random(&mut OsRng);
        let pubkey = key.verifying_key().to_encoded_point(true);

        let sig = sign_der(&key, &sha256(b"spend"));
        assert_eq!(verify_der(&sha256(b"other"), &sig, pubkey.as_bytes()), Ok(false));
    }

    #[test]
    fn test_verify_wrong_key() {
        let key = SigningKey::random(&mut OsRng);
        let other = SigningKey::random(&mut OsRng);
        let pubkey = other.verifying_key().to_encoded_point(true);
        let hash = sha256(b"spend");

        let sig = sign_der(&key, &hash);
        assert_eq!(verify_der(&hash, &sig, pubkey.as_bytes()), Ok(false));
    }

    #[test]
    fn test_malformed_inputs() {
        let key = SigningKey::random(&mut OsRng);
        let pubkey = key.verifying_key().to_encoded_point(true);
        let hash = sha256(b"spend");

        assert!(matches!(
            verify_der(&hash, &[0x30, 0x01], pubkey.as_bytes()),
            Err(CryptoError::InvalidSignature(_))
        ));

        let sig = sign_der(&key, &hash);
        assert!(matches!(
            verify_der(&hash, &sig, &[0x02; 5]),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }
}
