//! # scriptdbg-stepper
//!
//! Resumable, inspectable execution on top of the script machine.
//!
//! A [`Snapshot`] holds everything a debugger shows: program, counter,
//! both stacks, phase, completion, validity and breakpoints. The functions
//! in this crate map one snapshot to the next:
//!
//! ```
//! use scriptdbg_stepper::{initialize_text, run_to_completion};
//!
//! let snapshot = initialize_text("1 2", "ADD 3 EQUAL").unwrap();
//! let done = run_to_completion(snapshot);
//! assert!(done.is_complete());
//! assert!(done.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod controller;
mod error;
mod snapshot;
mod view;

pub use controller::{
    find_next_breakpoint, initialize, initialize_text, initialize_text_with, initialize_with,
    is_breakpoint, restart, run_to_completion, run_to_next_breakpoint, step_once,
    toggle_breakpoint, trace, STEP_LIMIT,
};
pub use error::StepError;
pub use snapshot::{SessionOptions, Snapshot, Status};
pub use view::{InstructionView, SnapshotView, StepView, TraceView};
