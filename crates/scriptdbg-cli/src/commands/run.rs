//! Run, step and trace commands

use crate::{
    commands::ScriptArgs,
    config::Config,
    output::{format_snapshot, format_status, Output},
    CliError,
};
use clap::Args;
use scriptdbg_stepper::{run_to_completion, step_once, trace, Snapshot};
use serde_json::Value;

/// Arguments for `scriptdbg step`
#[derive(Debug, Args)]
pub struct StepArgs {
    #[command(flatten)]
    pub script: ScriptArgs,

    /// Number of instructions to execute
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,
}

/// Run until completion or the first breakpoint
pub fn run(args: &ScriptArgs, config: &Config, json: bool) -> Result<(), CliError> {
    let snapshot = run_to_completion(args.session(config)?);
    print_snapshot(&snapshot, json)
}

/// Execute a fixed number of instructions, ignoring breakpoints
pub fn step(args: &StepArgs, config: &Config, json: bool) -> Result<(), CliError> {
    let mut snapshot = args.script.session(config)?;
    for _ in 0..args.count {
        if snapshot.is_complete() {
            break;
        }
        snapshot = step_once(snapshot);
    }
    print_snapshot(&snapshot, json)
}

/// Print the program once, then the state after every step
pub fn trace_all(args: &ScriptArgs, config: &Config, json: bool) -> Result<(), CliError> {
    let view = trace(args.session(config)?);

    let lines: Vec<String> = view
        .trace
        .iter()
        .enumerate()
        .map(|(step, state)| format!("{:>5}: {}", step, format_status(state)))
        .collect();

    Output::new(json)
        .field_u64("steps", view.steps() as u64)
        .field_u64("unlocking_len", view.unlocking_len as u64)
        .field_value("program", serde_json::to_value(&view.program)?)
        .field_value("breakpoints", serde_json::to_value(&view.breakpoints)?)
        .field_value("trace", serde_json::to_value(&view.trace)?)
        .message(&lines.join("\n"))
        .print();

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<(), CliError> {
    let view = snapshot.view();
    let message = format_snapshot(&view);
    let fields = match serde_json::to_value(&view)? {
        Value::Object(fields) => fields,
        _ => return Err(CliError::InvalidInput("snapshot is not an object".to_string())),
    };

    fields
        .into_iter()
        .fold(Output::new(json), |output, (key, value)| {
            output.field_value(&key, value)
        })
        .message(&message)
        .print();

    Ok(())
}
