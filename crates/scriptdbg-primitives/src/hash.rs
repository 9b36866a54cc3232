//! Digest types (H256, H160)

use std::fmt;

/// 256-bit digest (SHA-256, double SHA-256, signature hashes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct H256([u8; 32]);

impl H256 {
    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex without prefix, the way script data is shown
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 160-bit digest (RIPEMD-160, HASH160, SHA-1)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct H160([u8; 20]);

impl H160 {
    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        H160(bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for H160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H160({})", self.to_hex())
    }
}

impl fmt::Display for H160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== H256 tests ====================

    #[test]
    fn test_h256_zero() {
        assert_eq!(H256::ZERO, H256::default());
        assert_eq!(H256::ZERO.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_h256_display_is_bare_hex() {
        let hash = H256::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
        assert!(format!("{:?}", hash).starts_with("H256("));
    }

    // ==================== H160 tests ====================

    #[test]
    fn test_h160_bytes_and_hex() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x75;
        bytes[19] = 0xd6;
        let hash = H160::from_bytes(bytes);
        assert_eq!(hash.as_bytes(), &bytes);
        assert_eq!(hash.to_hex(), format!("75{}d6", "00".repeat(18)));
        assert_eq!(format!("{:?}", hash), format!("H160({})", hash));
    }
}
