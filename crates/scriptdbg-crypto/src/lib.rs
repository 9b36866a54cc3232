//! # scriptdbg-crypto
//!
//! Cryptographic primitives behind the script crypto opcodes.
//!
//! - SHA-1, SHA-256, RIPEMD-160 digests
//! - HASH160 (RIPEMD-160 of SHA-256) and HASH256 (double SHA-256)
//! - secp256k1 ECDSA verification of DER-encoded signatures

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod signature;
mod error;

pub use hash::{hash160, hash256, ripemd160, sha1, sha256};
pub use signature::{verify_der, PublicKey};
pub use error::CryptoError;
