//! # scriptdbg-primitives
//!
//! Fixed-size digest types used by the script crypto opcodes and
//! signature hashing.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{H160, H256};
