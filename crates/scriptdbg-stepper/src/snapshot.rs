//! Machine snapshots

use crate::controller::is_breakpoint;
use crate::error::StepError;
use crate::view::{InstructionView, SnapshotView, StepView};
use scriptdbg_vm::{Machine, MachineConfig, Phase, Program, TxContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Where a snapshot stands in its lineage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// More steps can be taken
    Running,
    /// The counter sits on a breakpoint
    Paused,
    /// Finished, successfully or not. Terminal.
    Complete,
}

/// Machine limits and transaction context for a session
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Machine limits
    pub config: MachineConfig,
    /// Signature hash provider; simplified signature checks when absent
    pub tx_context: Option<Arc<dyn TxContext>>,
}

impl SessionOptions {
    /// Replace the machine limits
    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a transaction context
    pub fn with_context(mut self, tx_context: Arc<dyn TxContext>) -> Self {
        self.tx_context = Some(tx_context);
        self
    }

    pub(crate) fn machine_for(&self, program: &Program) -> Machine {
        let machine = Machine::with_config(program.clone(), self.config);
        match &self.tx_context {
            Some(tx_context) => machine.with_context(tx_context.clone()),
            None => machine,
        }
    }
}

/// Complete, inspectable state after some number of steps.
///
/// Snapshots are values: every controller operation consumes one and
/// returns the next. Cloning a snapshot forks the lineage; the machine is
/// shared until either copy steps, then copied.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub(crate) program: Program,
    pub(crate) pc: usize,
    pub(crate) main_stack: Vec<Vec<u8>>,
    pub(crate) alt_stack: Vec<Vec<u8>>,
    pub(crate) complete: bool,
    pub(crate) valid: bool,
    pub(crate) phase: Phase,
    pub(crate) error: Option<StepError>,
    pub(crate) breakpoints: BTreeSet<usize>,
    pub(crate) options: SessionOptions,
    /// Attached on the first step
    pub(crate) machine: Option<Arc<Machine>>,
}

impl Snapshot {
    pub(crate) fn new(program: Program, options: SessionOptions) -> Self {
        let phase = program.phase_at(0);
        Self {
            program,
            pc: 0,
            main_stack: Vec::new(),
            alt_stack: Vec::new(),
            complete: false,
            valid: false,
            phase,
            error: None,
            breakpoints: BTreeSet::new(),
            options,
            machine: None,
        }
    }

    /// Concatenated unlocking and locking instructions
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Index of the next instruction
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Main stack, bottom to top
    pub fn main_stack(&self) -> &[Vec<u8>] {
        &self.main_stack
    }

    /// Alt stack, bottom to top
    pub fn alt_stack(&self) -> &[Vec<u8>] {
        &self.alt_stack
    }

    /// Check if execution has finished
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Script validity. Always false before completion.
    pub fn is_valid(&self) -> bool {
        self.complete && self.valid
    }

    /// Phase of the counter
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Error that halted execution
    pub fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    /// Explicit breakpoints. Inline markers are not listed.
    pub fn breakpoints(&self) -> &BTreeSet<usize> {
        &self.breakpoints
    }

    /// Session options the machine is created with
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Check if the counter is on a breakpoint
    pub fn at_breakpoint(&self) -> bool {
        is_breakpoint(&self.breakpoints, &self.program, self.pc)
    }

    /// Current lineage state
    pub fn status(&self) -> Status {
        if self.complete {
            Status::Complete
        } else if self.at_breakpoint() {
            Status::Paused
        } else {
            Status::Running
        }
    }

    /// Serializable projection of this snapshot
    pub fn view(&self) -> SnapshotView {
        SnapshotView {
            program: self.listing(),
            unlocking_len: self.program.unlocking_len(),
            breakpoints: self.breakpoints.iter().copied().collect(),
            state: self.step_view(),
        }
    }

    /// Program listing with breakpoint flags
    pub fn listing(&self) -> Vec<InstructionView> {
        self.program
            .instructions()
            .iter()
            .enumerate()
            .map(|(index, instruction)| InstructionView {
                index,
                opcode: instruction.opcode.name(),
                code: instruction.opcode.to_byte(),
                data: instruction.data.as_ref().map(hex::encode),
                phase: self.program.phase_at(index).to_string(),
                breakpoint: is_breakpoint(&self.breakpoints, &self.program, index),
            })
            .collect()
    }

    /// Counter, stacks and completion, without the listing
    pub fn step_view(&self) -> StepView {
        StepView {
            pc: self.pc,
            phase: self.phase.to_string(),
            status: self.status(),
            main_stack: self.main_stack.iter().map(hex::encode).collect(),
            alt_stack: self.alt_stack.iter().map(hex::encode).collect(),
            complete: self.complete,
            valid: self.complete.then_some(self.valid),
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{initialize_text, step_once};

    #[test]
    fn test_initial_snapshot() {
        let snapshot = initialize_text("1 2", "ADD").unwrap();
        assert_eq!(snapshot.pc(), 0);
        assert!(snapshot.main_stack().is_empty());
        assert!(snapshot.alt_stack().is_empty());
        assert!(!snapshot.is_complete());
        assert!(!snapshot.is_valid());
        assert_eq!(snapshot.phase(), Phase::Unlocking);
        assert_eq!(snapshot.status(), Status::Running);
        assert!(snapshot.machine.is_none());
    }

    #[test]
    fn test_initial_phase_without_unlocking() {
        let snapshot = initialize_text("", "1").unwrap();
        assert_eq!(snapshot.phase(), Phase::Locking);
    }

    #[test]
    fn test_inline_marker_pauses() {
        let snapshot = initialize_text("BREAKPOINT", "1").unwrap();
        assert!(snapshot.at_breakpoint());
        assert_eq!(snapshot.status(), Status::Paused);
        assert!(snapshot.breakpoints().is_empty());
    }

    #[test]
    fn test_view_fields() {
        let view = initialize_text("ff", "DUP").unwrap().view();
        assert_eq!(view.program.len(), 2);
        assert_eq!(view.program[0].opcode, "OP_PUSHBYTES_1");
        assert_eq!(view.program[0].data.as_deref(), Some("ff"));
        assert_eq!(view.program[0].phase, "unlocking");
        assert_eq!(view.program[1].opcode, "OP_DUP");
        assert_eq!(view.program[1].code, 0x76);
        assert_eq!(view.program[1].data, None);
        assert_eq!(view.unlocking_len, 1);
        assert_eq!(view.state.status, Status::Running);
        assert_eq!(view.state.valid, None);
        assert_eq!(view.state.error, None);
    }

    #[test]
    fn test_step_view_matches_view() {
        let snapshot = step_once(initialize_text("1 2", "ADD").unwrap());
        let state = snapshot.step_view();
        assert_eq!(state, snapshot.view().state);
        assert_eq!(state.pc, 1);
        assert_eq!(state.main_stack, vec!["01"]);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Paused).unwrap(), "\"paused\"");
    }
}
