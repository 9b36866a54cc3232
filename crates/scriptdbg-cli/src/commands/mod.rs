//! CLI command implementations

pub mod debug;
pub mod parse;
pub mod run;

use crate::{config::Config, CliError};
use clap::Args;
use scriptdbg_stepper::{initialize_text_with, toggle_breakpoint, SessionOptions, Snapshot};
use std::path::PathBuf;

/// Script pair shared by every execution command
#[derive(Debug, Args)]
pub struct ScriptArgs {
    /// Unlocking script text
    #[arg(short = 'u', long, default_value = "", conflicts_with = "unlocking_file")]
    pub unlocking: String,

    /// Locking script text
    #[arg(short = 'l', long, default_value = "", conflicts_with = "locking_file")]
    pub locking: String,

    /// Read the unlocking script from a file
    #[arg(long)]
    pub unlocking_file: Option<PathBuf>,

    /// Read the locking script from a file
    #[arg(long)]
    pub locking_file: Option<PathBuf>,

    /// Instruction index to break at (repeatable)
    #[arg(short = 'b', long = "break", value_name = "INDEX")]
    pub breakpoints: Vec<usize>,
}

impl ScriptArgs {
    /// Parse both scripts and start a session with the configured limits
    pub fn session(&self, config: &Config) -> Result<Snapshot, CliError> {
        let unlocking = read_script(&self.unlocking, self.unlocking_file.as_ref())?;
        let locking = read_script(&self.locking, self.locking_file.as_ref())?;
        let options = SessionOptions::default().with_config(config.machine_config());

        let snapshot = initialize_text_with(&unlocking, &locking, options)?;
        Ok(self
            .breakpoints
            .iter()
            .fold(snapshot, |snapshot, &index| toggle_breakpoint(snapshot, index)))
    }
}

/// Inline text, or the contents of `file` when given
pub fn read_script(inline: &str, file: Option<&PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(inline.to_string()),
    }
}
