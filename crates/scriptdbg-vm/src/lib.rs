//! # scriptdbg-vm
//!
//! Stack machine for a Bitcoin-style script language.
//!
//! This crate provides:
//! - Opcode table and push classification
//! - Script number encoding
//! - Text parser (strict assembly with a lenient fallback)
//! - A machine that executes one instruction per step

#![warn(missing_docs)]
#![warn(clippy::all)]

mod context;
mod error;
mod instruction;
mod machine;
pub mod num;
mod opcode;
pub mod parser;
mod stack;

pub use context::{FixedSighash, MachineConfig, TxContext};
pub use error::{ParseError, ParseResult, VmError, VmResult};
pub use instruction::{encode, Instruction, Phase, Program};
pub use machine::{Machine, MAX_PUBKEYS_PER_MULTISIG};
pub use num::{cast_to_bool, decode_num, encode_num};
pub use opcode::{Opcode, BREAKPOINT_MARKER, MAX_DIRECT_PUSH};
pub use parser::parse;
pub use stack::{Stack, MAX_STACK_SIZE};
