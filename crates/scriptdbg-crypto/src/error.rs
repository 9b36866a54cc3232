//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature bytes are not a valid DER encoding
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Public key bytes are not a valid SEC1 point
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}
