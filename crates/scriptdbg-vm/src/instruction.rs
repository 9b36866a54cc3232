//! Instructions, programs and raw script serialization

use crate::num::encode_num;
use crate::opcode::Opcode;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// A single parsed instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Opcode
    pub opcode: Opcode,
    /// Inline push data, present only for pushbytes/pushdata opcodes
    pub data: Option<Vec<u8>>,
}

impl Instruction {
    /// Instruction without data
    pub fn op(opcode: Opcode) -> Self {
        Self { opcode, data: None }
    }

    /// Push `data` with the smallest push opcode that fits
    pub fn push(data: Vec<u8>) -> Self {
        if data.is_empty() {
            return Self::op(Opcode::OP_0);
        }
        Self {
            opcode: Opcode::push_for_len(data.len()),
            data: Some(data),
        }
    }

    /// Push `data` with an explicit opcode, possibly non-minimal
    pub fn push_with(opcode: Opcode, data: Vec<u8>) -> Self {
        Self {
            opcode,
            data: Some(data),
        }
    }

    /// Push an integer: small-int opcodes for -1..=16, minimal encoding otherwise
    pub fn push_num(value: i64) -> Self {
        match Opcode::from_small_int(value) {
            Some(opcode) => Self::op(opcode),
            None => Self::push(encode_num(value)),
        }
    }

    /// Append the raw encoding of this instruction
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.opcode.to_byte());
        let Some(data) = &self.data else {
            return;
        };
        match self.opcode {
            Opcode::OP_PUSHDATA1 => out.push(data.len() as u8),
            Opcode::OP_PUSHDATA2 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            Opcode::OP_PUSHDATA4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(data);
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} {}", self.opcode, hex::encode(data)),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// Serialize instructions to raw script bytes
pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::new();
    for instruction in instructions {
        instruction.encode_into(&mut out);
    }
    out
}

/// Which of the two concatenated scripts the counter is in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Executing the unlocking script
    Unlocking,
    /// Executing the locking script
    Locking,
}

impl Phase {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Unlocking => "unlocking",
            Phase::Locking => "locking",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unlocking then locking instructions, shared immutably between snapshots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    instructions: Arc<[Instruction]>,
    unlocking_len: usize,
}

impl Program {
    /// Concatenate an unlocking and a locking script
    pub fn new(unlocking: Vec<Instruction>, locking: Vec<Instruction>) -> Self {
        let unlocking_len = unlocking.len();
        let mut instructions = unlocking;
        instructions.extend(locking);
        Self {
            instructions: instructions.into(),
            unlocking_len,
        }
    }

    /// All instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `index`
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Length of the unlocking prefix
    pub fn unlocking_len(&self) -> usize {
        self.unlocking_len
    }

    /// Phase the counter `pc` belongs to
    pub fn phase_at(&self, pc: usize) -> Phase {
        if pc < self.unlocking_len {
            Phase::Unlocking
        } else {
            Phase::Locking
        }
    }

    /// Index range of the script that contains `pc`
    pub fn script_range(&self, pc: usize) -> Range<usize> {
        match self.phase_at(pc) {
            Phase::Unlocking => 0..self.unlocking_len,
            Phase::Locking => self.unlocking_len..self.instructions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_picks_minimal_class() {
        assert_eq!(Instruction::push(vec![0xff]).opcode, Opcode::from_byte(1));
        assert_eq!(Instruction::push(vec![0; 75]).opcode, Opcode::from_byte(75));
        assert_eq!(Instruction::push(vec![0; 76]).opcode, Opcode::OP_PUSHDATA1);
        assert_eq!(Instruction::push(vec![0; 256]).opcode, Opcode::OP_PUSHDATA2);
        assert_eq!(Instruction::push(vec![]), Instruction::op(Opcode::OP_0));
    }

    #[test]
    fn test_push_num() {
        assert_eq!(Instruction::push_num(0), Instruction::op(Opcode::OP_0));
        assert_eq!(Instruction::push_num(-1), Instruction::op(Opcode::OP_1NEGATE));
        assert_eq!(Instruction::push_num(16), Instruction::op(Opcode::OP_16));
        assert_eq!(Instruction::push_num(17), Instruction::push(vec![0x11]));
        assert_eq!(Instruction::push_num(128), Instruction::push(vec![0x80, 0x00]));
    }

    #[test]
    fn test_encode() {
        let script = vec![
            Instruction::push(vec![0xab, 0xcd]),
            Instruction::op(Opcode::OP_DUP),
            Instruction::push_num(5),
        ];
        assert_eq!(encode(&script), vec![0x02, 0xab, 0xcd, 0x76, 0x55]);
    }

    #[test]
    fn test_encode_pushdata_prefixes() {
        let one = Instruction::push_with(Opcode::OP_PUSHDATA1, vec![0x11]);
        assert_eq!(encode(&[one]), vec![0x4c, 0x01, 0x11]);

        let two = Instruction::push_with(Opcode::OP_PUSHDATA2, vec![0x11]);
        assert_eq!(encode(&[two]), vec![0x4d, 0x01, 0x00, 0x11]);

        let four = Instruction::push_with(Opcode::OP_PUSHDATA4, vec![0x11]);
        assert_eq!(encode(&[four]), vec![0x4e, 0x01, 0x00, 0x00, 0x00, 0x11]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::push(vec![0xff]).to_string(), "OP_PUSHBYTES_1 ff");
        assert_eq!(Instruction::op(Opcode::OP_ADD).to_string(), "OP_ADD");
    }

    #[test]
    fn test_program_phases() {
        let program = Program::new(
            vec![Instruction::push_num(1), Instruction::push_num(2)],
            vec![Instruction::op(Opcode::OP_ADD)],
        );
        assert_eq!(program.len(), 3);
        assert_eq!(program.unlocking_len(), 2);
        assert_eq!(program.phase_at(0), Phase::Unlocking);
        assert_eq!(program.phase_at(1), Phase::Unlocking);
        assert_eq!(program.phase_at(2), Phase::Locking);
        assert_eq!(program.script_range(0), 0..2);
        assert_eq!(program.script_range(2), 2..3);
    }

    #[test]
    fn test_program_clone_shares_instructions() {
        let program = Program::new(vec![], vec![Instruction::op(Opcode::OP_NOP)]);
        let copy = program.clone();
        assert!(Arc::ptr_eq(&program.instructions, &copy.instructions));
    }
}
