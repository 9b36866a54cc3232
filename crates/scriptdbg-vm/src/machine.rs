//! Script stack machine

use crate::context::{MachineConfig, TxContext};
use crate::error::{VmError, VmResult};
use crate::instruction::{Instruction, Phase, Program};
use crate::num::{cast_to_bool, encode_bool, encode_num};
use crate::opcode::Opcode;
use crate::stack::Stack;
use scriptdbg_crypto::{hash160, hash256, ripemd160, sha1, sha256, verify_der};
use std::sync::Arc;
use tracing::{debug, trace};

/// Maximum number of public keys accepted by CHECKMULTISIG
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

/// Machine state
#[derive(Clone, Debug)]
pub struct Machine {
    /// Program being executed
    program: Program,
    /// Index of the next instruction
    pc: usize,
    /// Main stack
    main: Stack,
    /// Alt stack
    alt: Stack,
    /// One entry per open IF, true while its current branch executes
    conditions: Vec<bool>,
    /// Index of the last executed OP_CODESEPARATOR
    code_separator: Option<usize>,
    /// Fatal error, once one occurred
    error: Option<VmError>,
    /// Limits
    config: MachineConfig,
    /// Signature hash provider, simplified mode when absent
    tx_context: Option<Arc<dyn TxContext>>,
}

impl Machine {
    /// Create a machine with default limits and no transaction context
    pub fn new(program: Program) -> Self {
        Self::with_config(program, MachineConfig::default())
    }

    /// Create a machine with explicit limits
    pub fn with_config(program: Program, config: MachineConfig) -> Self {
        Self {
            program,
            pc: 0,
            main: Stack::new(),
            alt: Stack::new(),
            conditions: Vec::new(),
            code_separator: None,
            error: None,
            config,
            tx_context: None,
        }
    }

    /// Attach a transaction context for signature checks
    pub fn with_context(mut self, tx_context: Arc<dyn TxContext>) -> Self {
        self.tx_context = Some(tx_context);
        self
    }

    /// Execute until the program ends or fails. Returns the validity of the
    /// final stack, or the fatal error.
    pub fn run(&mut self) -> VmResult<bool> {
        while self.step() {}
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.is_valid()),
        }
    }

    /// Execute the instruction at the counter.
    ///
    /// Returns whether another step is possible. A failing instruction
    /// records the error and leaves the counter and both stacks as they
    /// were before it.
    pub fn step(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        let program = self.program.clone();
        let Some(instruction) = program.get(self.pc) else {
            return false;
        };

        trace!(pc = self.pc, opcode = %instruction.opcode, "step");
        let saved = (
            self.main.clone(),
            self.alt.clone(),
            self.conditions.clone(),
            self.code_separator,
        );
        if let Err(err) = self.execute(instruction) {
            debug!(pc = self.pc, opcode = %instruction.opcode, %err, "execution failed");
            (self.main, self.alt, self.conditions, self.code_separator) = saved;
            self.error = Some(err);
            return false;
        }

        self.pc += 1;
        if self.pc < program.len() {
            return true;
        }
        if !self.conditions.is_empty() {
            debug!(open = self.conditions.len(), "program ended inside a conditional");
            self.error = Some(VmError::UnbalancedConditional);
        }
        false
    }

    /// Check if all enclosing IF branches execute
    fn is_executing(&self) -> bool {
        self.conditions.iter().all(|&branch| branch)
    }

    fn execute(&mut self, instruction: &Instruction) -> VmResult<()> {
        if !self.is_executing() && !instruction.opcode.is_conditional() {
            return Ok(());
        }

        self.dispatch(instruction)?;

        let depth = self.main.len() + self.alt.len();
        if depth > self.config.max_stack_size {
            return Err(VmError::StackOverflow(self.config.max_stack_size));
        }
        Ok(())
    }

    fn dispatch(&mut self, instruction: &Instruction) -> VmResult<()> {
        let opcode = instruction.opcode;

        // Push value
        if opcode.carries_data() {
            self.main.push(instruction.data.clone().unwrap_or_default());
            return Ok(());
        }
        if let Some(value) = opcode.small_int() {
            self.main.push(encode_num(value));
            return Ok(());
        }

        match opcode {
            // Flow control
            Opcode::OP_NOP
            | Opcode::OP_NOP1
            | Opcode::OP_CHECKLOCKTIMEVERIFY
            | Opcode::OP_CHECKSEQUENCEVERIFY => {}
            op if (Opcode::OP_NOP4..=Opcode::OP_NOP10).contains(&op) => {}
            Opcode::OP_IF | Opcode::OP_NOTIF => {
                let mut branch = false;
                if self.is_executing() {
                    branch = self.main.pop_bool()?;
                    if opcode == Opcode::OP_NOTIF {
                        branch = !branch;
                    }
                }
                self.conditions.push(branch);
            }
            Opcode::OP_ELSE => {
                let branch = self
                    .conditions
                    .last_mut()
                    .ok_or(VmError::UnbalancedConditional)?;
                *branch = !*branch;
            }
            Opcode::OP_ENDIF => {
                self.conditions
                    .pop()
                    .ok_or(VmError::UnbalancedConditional)?;
            }
            Opcode::OP_VERIFY => {
                if !self.main.pop_bool()? {
                    return Err(VmError::VerifyFailed(opcode));
                }
            }
            Opcode::OP_RETURN => return Err(VmError::OpReturn),

            // Stack
            Opcode::OP_TOALTSTACK => {
                let value = self.main.pop()?;
                self.alt.push(value);
            }
            Opcode::OP_FROMALTSTACK => {
                let value = self.alt.pop()?;
                self.main.push(value);
            }
            Opcode::OP_2DROP => {
                self.main.pop()?;
                self.main.pop()?;
            }
            Opcode::OP_2DUP => {
                self.main.dup(1)?;
                self.main.dup(1)?;
            }
            Opcode::OP_3DUP => {
                self.main.dup(2)?;
                self.main.dup(2)?;
                self.main.dup(2)?;
            }
            Opcode::OP_2OVER => {
                self.main.dup(3)?;
                self.main.dup(3)?;
            }
            Opcode::OP_2ROT => {
                let first = self.main.remove_at(5)?;
                let second = self.main.remove_at(4)?;
                self.main.push(first);
                self.main.push(second);
            }
            Opcode::OP_2SWAP => {
                let first = self.main.remove_at(3)?;
                let second = self.main.remove_at(2)?;
                self.main.push(first);
                self.main.push(second);
            }
            Opcode::OP_IFDUP => {
                if cast_to_bool(self.main.peek()?) {
                    self.main.dup(0)?;
                }
            }
            Opcode::OP_DEPTH => {
                let depth = self.main.len() as i64;
                self.main.push(encode_num(depth));
            }
            Opcode::OP_DROP => {
                self.main.pop()?;
            }
            Opcode::OP_DUP => self.main.dup(0)?,
            Opcode::OP_NIP => {
                self.main.remove_at(1)?;
            }
            Opcode::OP_OVER => self.main.dup(1)?,
            Opcode::OP_PICK => {
                let depth = self.pop_depth()?;
                self.main.dup(depth)?;
            }
            Opcode::OP_ROLL => {
                let depth = self.pop_depth()?;
                let value = self.main.remove_at(depth)?;
                self.main.push(value);
            }
            Opcode::OP_ROT => {
                let value = self.main.remove_at(2)?;
                self.main.push(value);
            }
            Opcode::OP_SWAP => self.main.swap(1)?,
            Opcode::OP_TUCK => {
                let top = self.main.peek()?.clone();
                self.main.insert_at(2, top)?;
            }

            // Splice
            Opcode::OP_SIZE => {
                let size = self.main.peek()?.len() as i64;
                self.main.push(encode_num(size));
            }

            // Bitwise logic
            Opcode::OP_EQUAL | Opcode::OP_EQUALVERIFY => {
                let b = self.main.pop()?;
                let a = self.main.pop()?;
                self.finish_check(opcode, Opcode::OP_EQUALVERIFY, a == b)?;
            }

            // Arithmetic
            Opcode::OP_1ADD
            | Opcode::OP_1SUB
            | Opcode::OP_NEGATE
            | Opcode::OP_ABS
            | Opcode::OP_NOT
            | Opcode::OP_0NOTEQUAL => {
                let a = self.pop_num()?;
                let result = match opcode {
                    Opcode::OP_1ADD => a.checked_add(1),
                    Opcode::OP_1SUB => a.checked_sub(1),
                    Opcode::OP_NEGATE => a.checked_neg(),
                    Opcode::OP_ABS => a.checked_abs(),
                    Opcode::OP_NOT => Some((a == 0) as i64),
                    _ => Some((a != 0) as i64),
                }
                .ok_or(VmError::ArithmeticOverflow)?;
                self.main.push(encode_num(result));
            }
            Opcode::OP_ADD | Opcode::OP_SUB => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                let result = if opcode == Opcode::OP_ADD {
                    a.checked_add(b)
                } else {
                    a.checked_sub(b)
                }
                .ok_or(VmError::ArithmeticOverflow)?;
                self.main.push(encode_num(result));
            }
            Opcode::OP_MIN | Opcode::OP_MAX => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                let result = if opcode == Opcode::OP_MIN { a.min(b) } else { a.max(b) };
                self.main.push(encode_num(result));
            }
            Opcode::OP_BOOLAND
            | Opcode::OP_BOOLOR
            | Opcode::OP_NUMEQUAL
            | Opcode::OP_NUMEQUALVERIFY
            | Opcode::OP_NUMNOTEQUAL
            | Opcode::OP_LESSTHAN
            | Opcode::OP_GREATERTHAN
            | Opcode::OP_LESSTHANOREQUAL
            | Opcode::OP_GREATERTHANOREQUAL => {
                let b = self.pop_num()?;
                let a = self.pop_num()?;
                let result = match opcode {
                    Opcode::OP_BOOLAND => a != 0 && b != 0,
                    Opcode::OP_BOOLOR => a != 0 || b != 0,
                    Opcode::OP_NUMEQUAL | Opcode::OP_NUMEQUALVERIFY => a == b,
                    Opcode::OP_NUMNOTEQUAL => a != b,
                    Opcode::OP_LESSTHAN => a < b,
                    Opcode::OP_GREATERTHAN => a > b,
                    Opcode::OP_LESSTHANOREQUAL => a <= b,
                    _ => a >= b,
                };
                self.finish_check(opcode, Opcode::OP_NUMEQUALVERIFY, result)?;
            }
            Opcode::OP_WITHIN => {
                let max = self.pop_num()?;
                let min = self.pop_num()?;
                let x = self.pop_num()?;
                self.main.push(encode_bool(min <= x && x < max));
            }

            // Crypto
            Opcode::OP_RIPEMD160 => {
                let value = self.main.pop()?;
                self.main.push(ripemd160(&value).as_bytes().to_vec());
            }
            Opcode::OP_SHA1 => {
                let value = self.main.pop()?;
                self.main.push(sha1(&value).as_bytes().to_vec());
            }
            Opcode::OP_SHA256 => {
                let value = self.main.pop()?;
                self.main.push(sha256(&value).as_bytes().to_vec());
            }
            Opcode::OP_HASH160 => {
                let value = self.main.pop()?;
                self.main.push(hash160(&value).as_bytes().to_vec());
            }
            Opcode::OP_HASH256 => {
                let value = self.main.pop()?;
                self.main.push(hash256(&value).as_bytes().to_vec());
            }
            Opcode::OP_CODESEPARATOR => {
                self.code_separator = Some(self.pc);
            }
            Opcode::OP_CHECKSIG | Opcode::OP_CHECKSIGVERIFY => {
                let pubkey = self.main.pop()?;
                let signature = self.main.pop()?;
                let valid = self.check_signature(&signature, &pubkey)?;
                self.finish_check(opcode, Opcode::OP_CHECKSIGVERIFY, valid)?;
            }
            Opcode::OP_CHECKMULTISIG | Opcode::OP_CHECKMULTISIGVERIFY => {
                let valid = self.check_multisig()?;
                self.finish_check(opcode, Opcode::OP_CHECKMULTISIGVERIFY, valid)?;
            }

            op if op.is_disabled() => {
                debug!(opcode = %op, "disabled opcode");
                return Err(VmError::InvalidOpcode(op.to_byte()));
            }
            // Reserved and unassigned codes
            _ => return Err(VmError::InvalidOpcode(opcode.to_byte())),
        }

        Ok(())
    }

    /// Push the boolean result, or for the verify variant fail on false
    fn finish_check(&mut self, opcode: Opcode, verify: Opcode, result: bool) -> VmResult<()> {
        if opcode == verify {
            if !result {
                return Err(VmError::VerifyFailed(opcode));
            }
        } else {
            self.main.push(encode_bool(result));
        }
        Ok(())
    }

    fn pop_num(&mut self) -> VmResult<i64> {
        self.main.pop_num(self.config.max_num_len)
    }

    /// Pop a PICK/ROLL depth; negative depths underflow
    fn pop_depth(&mut self) -> VmResult<usize> {
        let depth = self.pop_num()?;
        usize::try_from(depth).map_err(|_| VmError::StackUnderflow)
    }

    fn check_multisig(&mut self) -> VmResult<bool> {
        let key_count = self.pop_num()?;
        if !(0..=MAX_PUBKEYS_PER_MULTISIG).contains(&key_count) {
            return Err(VmError::InvalidMultisig(format!(
                "key count {} out of range",
                key_count
            )));
        }
        let keys = (0..key_count)
            .map(|_| self.main.pop())
            .collect::<VmResult<Vec<_>>>()?;

        let sig_count = self.pop_num()?;
        if !(0..=key_count).contains(&sig_count) {
            return Err(VmError::InvalidMultisig(format!(
                "signature count {} out of range for {} keys",
                sig_count, key_count
            )));
        }
        let signatures = (0..sig_count)
            .map(|_| self.main.pop())
            .collect::<VmResult<Vec<_>>>()?;

        // One extra element is consumed, matching the historical consensus rule.
        self.main.pop()?;

        // Keys and signatures were popped in the same (reversed) order, so a
        // single forward scan enforces the ordering rule.
        let mut keys = keys.iter();
        for signature in &signatures {
            let mut matched = false;
            for key in keys.by_ref() {
                if self.check_signature(signature, key)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_signature(&self, signature: &[u8], pubkey: &[u8]) -> VmResult<bool> {
        let Some(tx_context) = &self.tx_context else {
            return Ok(true);
        };
        let Some((&sighash_type, der)) = signature.split_last() else {
            return Ok(false);
        };

        let digest = tx_context.signature_hash(&self.script_code(), sighash_type)?;
        match verify_der(&digest, der, pubkey) {
            Ok(valid) => Ok(valid),
            Err(err) => {
                debug!(%err, "undecodable signature or key");
                Ok(false)
            }
        }
    }

    /// Serialized script being executed, after the last OP_CODESEPARATOR
    fn script_code(&self) -> Vec<u8> {
        let range = self.program.script_range(self.pc);
        let start = match self.code_separator {
            Some(separator) if range.contains(&separator) => separator + 1,
            _ => range.start,
        };

        let mut code = Vec::new();
        for instruction in &self.program.instructions()[start..range.end] {
            if instruction.opcode != Opcode::OP_CODESEPARATOR {
                instruction.encode_into(&mut code);
            }
        }
        code
    }

    /// Program being executed
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Index of the next instruction
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Main stack, bottom to top
    pub fn main_stack(&self) -> &[Vec<u8>] {
        self.main.as_slice()
    }

    /// Alt stack, bottom to top
    pub fn alt_stack(&self) -> &[Vec<u8>] {
        self.alt.as_slice()
    }

    /// Phase of the counter
    pub fn phase(&self) -> Phase {
        self.program.phase_at(self.pc)
    }

    /// Fatal error, if one occurred
    pub fn error(&self) -> Option<&VmError> {
        self.error.as_ref()
    }

    /// Check if no further step is possible
    pub fn is_finished(&self) -> bool {
        self.error.is_some() || self.pc >= self.program.len()
    }

    /// True when no error occurred and the top of the main stack is truthy
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.main.peek().map(|top| cast_to_bool(top)).unwrap_or(false)
    }
}
