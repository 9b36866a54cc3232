//! Stepping and breakpoint control
//!
//! Every operation takes a snapshot by value and returns the next one.

use crate::error::StepError;
use crate::snapshot::{SessionOptions, Snapshot};
use crate::view::TraceView;
use scriptdbg_vm::{parse, Instruction, ParseError, Program, BREAKPOINT_MARKER};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Most steps a single run operation takes before giving up
pub const STEP_LIMIT: usize = 10_000;

/// Start a lineage with default options
pub fn initialize(unlocking: Vec<Instruction>, locking: Vec<Instruction>) -> Snapshot {
    initialize_with(unlocking, locking, SessionOptions::default())
}

/// Start a lineage with explicit machine limits and transaction context
pub fn initialize_with(
    unlocking: Vec<Instruction>,
    locking: Vec<Instruction>,
    options: SessionOptions,
) -> Snapshot {
    Snapshot::new(Program::new(unlocking, locking), options)
}

/// Parse both scripts and start a lineage
pub fn initialize_text(unlocking: &str, locking: &str) -> Result<Snapshot, ParseError> {
    initialize_text_with(unlocking, locking, SessionOptions::default())
}

/// Parse both scripts and start a lineage with explicit options
pub fn initialize_text_with(
    unlocking: &str,
    locking: &str,
    options: SessionOptions,
) -> Result<Snapshot, ParseError> {
    Ok(initialize_with(parse(unlocking)?, parse(locking)?, options))
}

/// Start a new lineage over the same program, keeping breakpoints and options
pub fn restart(snapshot: &Snapshot) -> Snapshot {
    let mut fresh = Snapshot::new(snapshot.program.clone(), snapshot.options.clone());
    fresh.breakpoints = snapshot.breakpoints.clone();
    fresh
}

/// Execute one instruction. A complete snapshot is returned unchanged.
pub fn step_once(mut snapshot: Snapshot) -> Snapshot {
    if snapshot.complete {
        return snapshot;
    }
    if snapshot.machine.is_none() {
        let machine = snapshot.options.machine_for(&snapshot.program);
        snapshot.machine = Some(Arc::new(machine));
    }
    let Some(shared) = snapshot.machine.as_mut() else {
        return snapshot;
    };
    // Copies the machine if another snapshot still refers to it.
    let machine = Arc::make_mut(shared);

    let continues = machine.step();
    snapshot.pc = machine.pc();
    snapshot.main_stack = machine.main_stack().to_vec();
    snapshot.alt_stack = machine.alt_stack().to_vec();
    snapshot.phase = machine.phase();

    if let Some(err) = machine.error() {
        let error = StepError::Vm {
            pc: snapshot.pc,
            source: err.clone(),
        };
        debug!(%error, "execution halted");
        snapshot.complete = true;
        snapshot.valid = false;
        snapshot.error = Some(error);
    } else if !continues || snapshot.pc >= snapshot.program.len() {
        snapshot.complete = true;
        snapshot.valid = machine.is_valid();
        debug!(valid = snapshot.valid, "execution complete");
    }
    snapshot
}

/// Step until completion, a breakpoint, or the step ceiling.
///
/// Always takes at least one step, so a snapshot paused on a breakpoint
/// moves forward.
pub fn run_to_completion(mut snapshot: Snapshot) -> Snapshot {
    for _ in 0..STEP_LIMIT {
        snapshot = step_once(snapshot);
        if snapshot.complete {
            return snapshot;
        }
        if snapshot.at_breakpoint() {
            debug!(pc = snapshot.pc, "paused at breakpoint");
            return snapshot;
        }
    }
    step_limit_reached(snapshot)
}

/// Step past the current breakpoint (if any), then until the next one,
/// completion, or the step ceiling.
pub fn run_to_next_breakpoint(mut snapshot: Snapshot) -> Snapshot {
    let mut steps = 0;
    if snapshot.at_breakpoint() {
        snapshot = step_once(snapshot);
        steps += 1;
    }

    while !snapshot.complete {
        if snapshot.at_breakpoint() {
            debug!(pc = snapshot.pc, "paused at breakpoint");
            return snapshot;
        }
        if steps >= STEP_LIMIT {
            return step_limit_reached(snapshot);
        }
        snapshot = step_once(snapshot);
        steps += 1;
    }
    snapshot
}

/// Add `index` to the breakpoint set, or remove it if present
pub fn toggle_breakpoint(mut snapshot: Snapshot, index: usize) -> Snapshot {
    if snapshot.complete {
        return snapshot;
    }
    if !snapshot.breakpoints.remove(&index) {
        snapshot.breakpoints.insert(index);
    }
    snapshot
}

/// First breakpoint after the counter
pub fn find_next_breakpoint(snapshot: &Snapshot) -> Option<usize> {
    (snapshot.pc + 1..snapshot.program.len())
        .find(|&index| is_breakpoint(&snapshot.breakpoints, &snapshot.program, index))
}

/// Breakpoint membership: explicit set or inline marker opcode
pub fn is_breakpoint(breakpoints: &BTreeSet<usize>, program: &Program, index: usize) -> bool {
    breakpoints.contains(&index)
        || program
            .get(index)
            .map_or(false, |instruction| instruction.opcode == BREAKPOINT_MARKER)
}

/// Program listing plus the state after every step until completion or the
/// step ceiling, starting with the given snapshot. Breakpoints do not stop a
/// trace.
pub fn trace(mut snapshot: Snapshot) -> TraceView {
    let program = snapshot.listing();
    let breakpoints = snapshot.breakpoints.iter().copied().collect();
    let mut states = vec![snapshot.step_view()];
    let mut steps = 0;
    while !snapshot.complete {
        snapshot = if steps >= STEP_LIMIT {
            step_limit_reached(snapshot)
        } else {
            steps += 1;
            step_once(snapshot)
        };
        states.push(snapshot.step_view());
    }
    TraceView {
        program,
        unlocking_len: snapshot.program.unlocking_len(),
        breakpoints,
        trace: states,
    }
}

fn step_limit_reached(mut snapshot: Snapshot) -> Snapshot {
    warn!(limit = STEP_LIMIT, pc = snapshot.pc, "step limit reached");
    snapshot.complete = true;
    snapshot.valid = false;
    snapshot.error = Some(StepError::TooManySteps(STEP_LIMIT));
    snapshot
}
