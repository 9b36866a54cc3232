//! Byte-string stack

use crate::error::{VmError, VmResult};
use crate::num::{cast_to_bool, decode_num};

/// Default combined element limit for the main and alt stacks
pub const MAX_STACK_SIZE: usize = 1000;

/// Script stack of byte strings. Depth 0 is the top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    data: Vec<Vec<u8>>,
}

impl Stack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Vec<u8>) {
        self.data.push(value);
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> VmResult<Vec<u8>> {
        self.data.pop().ok_or(VmError::StackUnderflow)
    }

    /// Pop and decode a script number
    pub fn pop_num(&mut self, max_len: usize) -> VmResult<i64> {
        let value = self.pop()?;
        decode_num(&value, max_len)
    }

    /// Pop and cast to bool
    pub fn pop_bool(&mut self) -> VmResult<bool> {
        let value = self.pop()?;
        Ok(cast_to_bool(&value))
    }

    /// Peek at the top of the stack
    pub fn peek(&self) -> VmResult<&Vec<u8>> {
        self.data.last().ok_or(VmError::StackUnderflow)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek_at(&self, depth: usize) -> VmResult<&Vec<u8>> {
        if depth >= self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with item at depth (1 = swap with second item)
    pub fn swap(&mut self, depth: usize) -> VmResult<()> {
        if depth == 0 || depth >= self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        let len = self.data.len();
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Duplicate item at depth to top (0 = dup top)
    pub fn dup(&mut self, depth: usize) -> VmResult<()> {
        let value = self.peek_at(depth)?.clone();
        self.data.push(value);
        Ok(())
    }

    /// Remove and return the item at depth
    pub fn remove_at(&mut self, depth: usize) -> VmResult<Vec<u8>> {
        if depth >= self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        let index = self.data.len() - 1 - depth;
        Ok(self.data.remove(index))
    }

    /// Insert so that the value ends up at `depth` (0 = push)
    pub fn insert_at(&mut self, depth: usize, value: Vec<u8>) -> VmResult<()> {
        if depth > self.data.len() {
            return Err(VmError::StackUnderflow);
        }
        let index = self.data.len() - depth;
        self.data.insert(index, value);
        Ok(())
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements bottom to top
    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.data
    }
}
