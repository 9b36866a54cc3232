//! Serializable snapshot views

use crate::snapshot::Status;
use serde::{Deserialize, Serialize};

/// One program instruction as shown to a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionView {
    /// Position in the concatenated program
    pub index: usize,
    /// Mnemonic
    pub opcode: String,
    /// Numeric code
    pub code: u8,
    /// Push data as hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// `unlocking` or `locking`
    pub phase: String,
    /// Explicit breakpoint or inline marker
    pub breakpoint: bool,
}

/// Execution state at one point, without the program listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    /// Index of the next instruction
    pub pc: usize,
    /// `unlocking` or `locking`
    pub phase: String,
    /// Lineage state
    pub status: Status,
    /// Main stack, bottom to top
    pub main_stack: Vec<String>,
    /// Alt stack, bottom to top
    pub alt_stack: Vec<String>,
    /// Execution finished
    pub complete: bool,
    /// Validity, present once complete
    pub valid: Option<bool>,
    /// Halting error
    pub error: Option<String>,
}

/// Field-by-field projection of a snapshot, stack elements as hex
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotView {
    /// Program listing
    pub program: Vec<InstructionView>,
    /// Length of the unlocking prefix
    pub unlocking_len: usize,
    /// Explicit breakpoints
    pub breakpoints: Vec<usize>,
    /// Counter, stacks and completion
    #[serde(flatten)]
    pub state: StepView,
}

/// A whole run: the listing once, then the state after every step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceView {
    /// Program listing
    pub program: Vec<InstructionView>,
    /// Length of the unlocking prefix
    pub unlocking_len: usize,
    /// Explicit breakpoints at the start of the trace
    pub breakpoints: Vec<usize>,
    /// Initial state followed by one entry per step
    pub trace: Vec<StepView>,
}

impl TraceView {
    /// Number of steps taken
    pub fn steps(&self) -> usize {
        self.trace.len().saturating_sub(1)
    }

    /// State the trace ended in
    pub fn last(&self) -> Option<&StepView> {
        self.trace.last()
    }
}
