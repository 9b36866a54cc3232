//! Script digests

use ripemd::Ripemd160;
use scriptdbg_primitives::{H160, H256};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Compute SHA-256 of the input data
pub fn sha256(data: &[u8]) -> H256 {
    H256::from_bytes(Sha256::digest(data).into())
}

/// Compute SHA-1 of the input data
pub fn sha1(data: &[u8]) -> H160 {
    H160::from_bytes(Sha1::digest(data).into())
}

/// Compute RIPEMD-160 of the input data
pub fn ripemd160(data: &[u8]) -> H160 {
    H160::from_bytes(Ripemd160::digest(data).into())
}

/// RIPEMD-160 of SHA-256, the digest behind `OP_HASH160`
pub fn hash160(data: &[u8]) -> H160 {
    ripemd160(sha256(data).as_bytes())
}

/// Double SHA-256, the digest behind `OP_HASH256`
pub fn hash256(data: &[u8]) -> H256 {
    sha256(sha256(data).as_bytes())
}
