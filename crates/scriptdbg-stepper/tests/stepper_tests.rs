//! Debugger-level tests for scriptdbg-stepper
//!
//! Drives whole sessions the way a front end would: initialize, step,
//! set breakpoints, run, inspect.

use proptest::prelude::*;
use scriptdbg_primitives::H256;
use scriptdbg_stepper::{
    find_next_breakpoint, initialize_text, initialize_text_with, run_to_completion,
    run_to_next_breakpoint, step_once, toggle_breakpoint, trace, SessionOptions, Snapshot,
    Status, StepError, STEP_LIMIT,
};
use scriptdbg_vm::{encode_num, FixedSighash, VmError};
use std::sync::Arc;

fn hex_stack(snapshot: &Snapshot) -> Vec<String> {
    snapshot.main_stack().iter().map(hex::encode).collect()
}

/// Script literal for any integer. Plain decimals like `10` would read as hex.
fn literal(value: i64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("0x{}", hex::encode(encode_num(value)))
    }
}

// ==================== Scenarios ====================

/// 1 + 2 == 3 runs all five instructions and leaves true on the stack
#[test]
fn test_scenario_add_equal() {
    let snapshot = run_to_completion(initialize_text("1 2", "ADD 3 EQUAL").unwrap());
    assert_eq!(snapshot.pc(), 5);
    assert_eq!(hex_stack(&snapshot), vec!["01"]);
    assert!(snapshot.is_complete());
    assert!(snapshot.is_valid());
    assert!(snapshot.error().is_none());
}

/// EQUALVERIFY with nothing to compare underflows at instruction 0
#[test]
fn test_scenario_underflow() {
    let snapshot = run_to_completion(initialize_text("", "EQUALVERIFY").unwrap());
    assert!(snapshot.is_complete());
    assert!(!snapshot.is_valid());
    assert_eq!(snapshot.pc(), 0);
    assert!(matches!(
        snapshot.error(),
        Some(StepError::Vm {
            source: VmError::StackUnderflow,
            ..
        })
    ));
}

/// A breakpoint in the middle of a five instruction program
#[test]
fn test_scenario_breakpoint() {
    let snapshot = toggle_breakpoint(initialize_text("1 2", "ADD 3 EQUAL").unwrap(), 2);
    let snapshot = run_to_next_breakpoint(snapshot);
    assert_eq!(snapshot.pc(), 2);
    assert!(!snapshot.is_complete());
    assert_eq!(snapshot.status(), Status::Paused);
}

/// Duplicated hex data compares equal to itself
#[test]
fn test_scenario_dup_equal() {
    let snapshot = run_to_completion(initialize_text("ff", "DUP EQUAL").unwrap());
    assert_eq!(hex_stack(&snapshot), vec!["01"]);
    assert!(snapshot.is_valid());
}

/// 128 is pushed as two bytes
#[test]
fn test_scenario_128() {
    let snapshot = step_once(initialize_text("128", "").unwrap());
    assert_eq!(hex_stack(&snapshot), vec!["8000"]);
}

/// Validity reads the top element only, extra elements do not invalidate
#[test]
fn test_valid_with_two_elements() {
    let snapshot = run_to_completion(initialize_text("1", "1").unwrap());
    assert!(snapshot.is_complete());
    assert_eq!(hex_stack(&snapshot), vec!["01", "01"]);
    assert!(snapshot.is_valid());
    assert_eq!(snapshot.view().state.valid, Some(true));
}

// ==================== Sessions ====================

/// Stepping, pausing and resuming reaches the same end state as one run
#[test]
fn test_interactive_session_matches_single_run() {
    let unlocking = "abcd 5";
    let locking = "TOALTSTACK SIZE 2 EQUALVERIFY FROMALTSTACK 5 NUMEQUAL";

    let direct = run_to_completion(initialize_text(unlocking, locking).unwrap());

    let mut snapshot = initialize_text(unlocking, locking).unwrap();
    snapshot = toggle_breakpoint(snapshot, 3);
    snapshot = toggle_breakpoint(snapshot, 6);
    snapshot = run_to_next_breakpoint(snapshot);
    assert_eq!(snapshot.pc(), 3);
    assert_eq!(snapshot.alt_stack().len(), 1);
    assert_eq!(find_next_breakpoint(&snapshot), Some(6));
    snapshot = step_once(snapshot);
    snapshot = run_to_next_breakpoint(snapshot);
    assert_eq!(snapshot.pc(), 6);
    snapshot = run_to_completion(snapshot);

    assert!(direct.is_valid());
    assert_eq!(snapshot.is_valid(), direct.is_valid());
    assert_eq!(snapshot.main_stack(), direct.main_stack());
    assert_eq!(snapshot.pc(), direct.pc());
}

/// Signature checks go through the supplied context
#[test]
fn test_context_changes_checksig_outcome() {
    let simplified = run_to_completion(initialize_text("3044 02", "CHECKSIG").unwrap());
    assert!(simplified.is_valid());

    let options = SessionOptions::default().with_context(Arc::new(FixedSighash(H256::ZERO)));
    let checked = run_to_completion(initialize_text_with("3044 02", "CHECKSIG", options).unwrap());
    assert!(checked.is_complete());
    assert!(!checked.is_valid());
    assert!(checked.error().is_none());
}

/// Views serialize with hex stacks and lowercase status
#[test]
fn test_view_json() {
    let snapshot = run_to_completion(initialize_text("1 2", "ADD 3 EQUAL").unwrap());
    let json = serde_json::to_value(snapshot.view()).unwrap();
    assert_eq!(json["pc"], 5);
    assert_eq!(json["status"], "complete");
    assert_eq!(json["valid"], true);
    assert_eq!(json["main_stack"][0], "01");
    assert_eq!(json["phase"], "locking");
    assert_eq!(json["program"][2]["opcode"], "OP_ADD");
}

/// A long trace still ends at the ceiling and lists the program once
#[test]
fn test_trace_is_bounded() {
    let text = "NOP ".repeat(STEP_LIMIT + 3);
    let view = trace(initialize_text("", &text).unwrap());
    assert_eq!(view.program.len(), STEP_LIMIT + 3);
    assert_eq!(view.trace.len(), STEP_LIMIT + 2);
    let last = view.last().unwrap();
    assert!(last.complete);
    assert_eq!(last.valid, Some(false));
    assert!(last.error.as_deref().unwrap().contains("too many steps"));

    let json = serde_json::to_value(&view).unwrap();
    assert!(json["trace"][0].get("program").is_none());
    assert_eq!(json["program"].as_array().unwrap().len(), STEP_LIMIT + 3);
}

#[test]
fn test_snapshot_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Snapshot>();
}

// ==================== Properties ====================

proptest! {
    #[test]
    fn prop_toggle_twice_is_identity(indices in proptest::collection::vec(0usize..16, 0..8), index in 0usize..16) {
        let mut snapshot = initialize_text("1 2", "ADD 3 EQUAL").unwrap();
        for i in indices {
            snapshot = toggle_breakpoint(snapshot, i);
        }
        let before = snapshot.breakpoints().clone();
        let after = toggle_breakpoint(toggle_breakpoint(snapshot, index), index);
        prop_assert_eq!(after.breakpoints(), &before);
    }

    #[test]
    fn prop_addition_validity(a in -1000i64..1000, b in -1000i64..1000, off in 0i64..2) {
        let unlocking = format!("{} {}", literal(a), literal(b));
        let locking = format!("ADD {} NUMEQUAL", literal(a + b + off));
        let snapshot = run_to_completion(initialize_text(&unlocking, &locking).unwrap());
        prop_assert!(snapshot.is_complete());
        prop_assert!(snapshot.error().is_none());
        prop_assert_eq!(snapshot.main_stack().len(), 1);
        prop_assert_eq!(snapshot.is_valid(), off == 0);
    }
}
