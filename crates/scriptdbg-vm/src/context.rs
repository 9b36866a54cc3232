//! Execution context for the script machine

use crate::error::VmResult;
use crate::num::DEFAULT_MAX_NUM_LEN;
use crate::stack::MAX_STACK_SIZE;
use scriptdbg_primitives::H256;
use std::fmt;

/// Source of signature hashes for CHECKSIG-family opcodes.
///
/// Without a context the machine runs in simplified mode and every
/// signature check succeeds.
pub trait TxContext: fmt::Debug + Send + Sync {
    /// Digest to verify a signature against.
    ///
    /// `script_code` is the serialized script being executed, starting
    /// after the last executed OP_CODESEPARATOR.
    fn signature_hash(&self, script_code: &[u8], sighash_type: u8) -> VmResult<H256>;
}

/// Context that answers every request with the same digest
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSighash(pub H256);

impl TxContext for FixedSighash {
    fn signature_hash(&self, _script_code: &[u8], _sighash_type: u8) -> VmResult<H256> {
        Ok(self.0)
    }
}

/// Machine limits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum operand length for arithmetic opcodes, in bytes
    pub max_num_len: usize,
    /// Maximum number of elements across main and alt stacks
    pub max_stack_size: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_num_len: DEFAULT_MAX_NUM_LEN,
            max_stack_size: MAX_STACK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sighash_ignores_inputs() {
        let digest = H256::from_bytes([7u8; 32]);
        let ctx = FixedSighash(digest);
        assert_eq!(ctx.signature_hash(&[], 0x01).unwrap(), digest);
        assert_eq!(ctx.signature_hash(&[0xac], 0x41).unwrap(), digest);
    }

    #[test]
    fn test_machine_config_default() {
        let config = MachineConfig::default();
        assert_eq!(config.max_num_len, 4);
        assert_eq!(config.max_stack_size, 1000);
    }
}
