//! Parse command

use crate::{commands::read_script, output::Output, CliError};
use clap::Args;
use scriptdbg_vm::{encode, parse, Instruction};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Arguments for `scriptdbg parse`
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Script text
    #[arg(default_value = "", conflicts_with = "file")]
    pub text: String,

    /// Read the script from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print the serialized script as hex instead of a listing
    #[arg(long)]
    pub raw: bool,
}

impl ParseArgs {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        let text = read_script(&self.text, self.file.as_ref())?;
        let instructions = parse(&text)?;
        let raw = hex::encode(encode(&instructions));

        let message = if self.raw {
            raw.clone()
        } else {
            listing(&instructions)
        };

        Output::new(json)
            .field_u64("count", instructions.len() as u64)
            .field("hex", &raw)
            .field_value(
                "instructions",
                Value::Array(instructions.iter().map(instruction_json).collect()),
            )
            .message(&message)
            .print();

        Ok(())
    }
}

fn listing(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .enumerate()
        .map(|(index, instruction)| format!("{:>4}  {}", index, instruction))
        .collect::<Vec<_>>()
        .join("\n")
}

fn instruction_json(instruction: &Instruction) -> Value {
    let mut value = json!({
        "opcode": instruction.opcode.name(),
        "code": instruction.opcode.to_byte(),
    });
    if let Some(data) = &instruction.data {
        value["data"] = Value::String(hex::encode(data));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing() {
        let instructions = parse("1 2 ADD").unwrap();
        let text = listing(&instructions);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("   2  OP_ADD"));
    }

    #[test]
    fn test_instruction_json() {
        let instructions = parse("abcd ADD").unwrap();
        let push = instruction_json(&instructions[0]);
        assert_eq!(push["code"], 2);
        assert_eq!(push["data"], "abcd");
        let add = instruction_json(&instructions[1]);
        assert_eq!(add["opcode"], "OP_ADD");
        assert!(add.get("data").is_none());
    }
}
