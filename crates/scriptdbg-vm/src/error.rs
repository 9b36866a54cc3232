//! Script VM error types

use crate::opcode::Opcode;
use thiserror::Error;

/// Fatal execution errors. A machine that hits one stops for good.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Main and alt stack together exceed the configured limit
    #[error("stack overflow (max {0})")]
    StackOverflow(usize),

    /// A verify-style opcode found a false result
    #[error("verification failed: {0}")]
    VerifyFailed(Opcode),

    /// Unknown, reserved or disabled opcode executed
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// OP_RETURN executed
    #[error("OP_RETURN executed")]
    OpReturn,

    /// Numeric operand longer than the configured maximum
    #[error("script number overflow: {len} bytes exceeds limit of {max}")]
    NumberOverflow {
        /// Operand length in bytes
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Arithmetic result outside the i64 range
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// ELSE/ENDIF without IF, or the program ended inside an IF
    #[error("unbalanced conditional")]
    UnbalancedConditional,

    /// Key or signature count out of range
    #[error("invalid multisig: {0}")]
    InvalidMultisig(String),

    /// Error reported by the transaction context while checking a signature
    #[error("signature check failed: {0}")]
    Signature(String),
}

/// Result type for VM operations
pub type VmResult<T> = Result<T, VmError>;

/// Script text parsing errors. `position` is the zero-based token index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Token is not a known mnemonic
    #[error("unknown opcode `{token}` at token {position}")]
    UnknownOpcode {
        /// Offending token
        token: String,
        /// Token index
        position: usize,
    },

    /// Decimal literal outside the i64 range
    #[error("number `{token}` at token {position} is out of range")]
    NumberOutOfRange {
        /// Offending token
        token: String,
        /// Token index
        position: usize,
    },

    /// Push opcode written without its data
    #[error("{opcode} at token {position} requires push data")]
    MissingPushData {
        /// Push opcode name
        opcode: String,
        /// Token index
        position: usize,
    },

    /// Explicit push data does not fit the written opcode
    #[error("{opcode} at token {position} cannot carry {len} bytes")]
    PushLengthMismatch {
        /// Push opcode name
        opcode: String,
        /// Data length in bytes
        len: usize,
        /// Token index
        position: usize,
    },

    /// Token outside the strict assembly grammar
    #[error("unexpected token `{token}` at token {position}")]
    UnexpectedToken {
        /// Offending token
        token: String,
        /// Token index
        position: usize,
    },
}

/// Result type for parsing
pub type ParseResult<T> = Result<T, ParseError>;
