//! Output formatting

use scriptdbg_stepper::{SnapshotView, Status, StepView};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Output builder for formatted CLI output
pub struct Output {
    json_mode: bool,
    fields: BTreeMap<String, Value>,
    message: Option<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: BTreeMap::new(),
            message: None,
        }
    }

    /// Add a string field to the output
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field to the output
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a JSON value field to the output
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set the human-readable message
    pub fn message(mut self, msg: &str) -> Self {
        self.message = Some(msg.to_string());
        self
    }

    /// Rendered text, if there is anything to print
    pub fn render(self) -> Option<String> {
        if self.json_mode {
            let json = json!(self.fields);
            Some(serde_json::to_string_pretty(&json).unwrap_or_default())
        } else {
            self.message
        }
    }

    /// Print the output
    pub fn print(self) {
        if let Some(text) = self.render() {
            println!("{}", text);
        }
    }
}

/// Listing, counter and stacks of a snapshot, one block of text
pub fn format_snapshot(view: &SnapshotView) -> String {
    let state = &view.state;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "pc {}/{} ({}) {}",
        state.pc,
        view.program.len(),
        state.phase,
        status_label(state)
    );

    for instruction in &view.program {
        let cursor = if instruction.index == state.pc { '>' } else { ' ' };
        let mark = if instruction.breakpoint { '*' } else { ' ' };
        let side = if instruction.index < view.unlocking_len {
            'u'
        } else {
            'l'
        };
        let _ = write!(
            out,
            "{}{} {:>4} {} {}",
            cursor, mark, instruction.index, side, instruction.opcode
        );
        if let Some(data) = &instruction.data {
            let _ = write!(out, " {}", data);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "main: {}", format_stack(&state.main_stack));
    let _ = write!(out, "alt:  {}", format_stack(&state.alt_stack));
    out
}

/// One-line summary of an execution state
pub fn format_status(state: &StepView) -> String {
    let mut line = format!("pc {} ({}) {}", state.pc, state.phase, status_label(state));
    if let Some(top) = state.main_stack.last() {
        let _ = write!(line, " top={}", display_element(top));
    }
    line
}

fn status_label(state: &StepView) -> String {
    match (state.status, state.valid, &state.error) {
        (Status::Complete, _, Some(error)) => format!("complete, invalid: {}", error),
        (Status::Complete, Some(true), None) => "complete, valid".to_string(),
        (Status::Complete, _, None) => "complete, invalid".to_string(),
        (Status::Paused, _, _) => "paused".to_string(),
        (Status::Running, _, _) => "running".to_string(),
    }
}

fn format_stack(stack: &[String]) -> String {
    let items: Vec<&str> = stack.iter().map(|s| display_element(s)).collect();
    format!("[{}]", items.join(", "))
}

fn display_element(element: &str) -> &str {
    if element.is_empty() {
        "<empty>"
    } else {
        element
    }
}
