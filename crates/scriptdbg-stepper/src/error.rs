//! Stepper error types

use scriptdbg_vm::VmError;
use thiserror::Error;

/// Why a snapshot halted with an error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The machine hit a fatal condition
    #[error("{source} at instruction {pc}")]
    Vm {
        /// Counter of the failing instruction
        pc: usize,
        /// Underlying machine error
        #[source]
        source: VmError,
    },

    /// A run loop hit the step ceiling
    #[error("too many steps (limit {0})")]
    TooManySteps(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = StepError::Vm {
            pc: 0,
            source: VmError::StackUnderflow,
        };
        assert_eq!(format!("{}", err), "stack underflow at instruction 0");
        assert_eq!(
            format!("{}", StepError::TooManySteps(10_000)),
            "too many steps (limit 10000)"
        );
    }

    #[test]
    fn test_error_source() {
        let err = StepError::Vm {
            pc: 3,
            source: VmError::OpReturn,
        };
        assert!(err.source().is_some());
        assert!(StepError::TooManySteps(1).source().is_none());
    }
}
