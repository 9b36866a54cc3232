//! # scriptdbg
//!
//! Command-line debugger for locking and unlocking scripts.
//!
//! ## Usage
//!
//! ```bash
//! # Show how a script parses
//! scriptdbg parse "OP_DUP OP_HASH160 OP_PUSHBYTES_20 89abcdefabbaabbaabbaabbaabbaabbaabbaabba OP_EQUALVERIFY OP_CHECKSIG"
//! scriptdbg parse --raw "1 2 ADD"
//!
//! # Execute
//! scriptdbg run -u "1 2" -l "ADD 3 EQUAL"
//! scriptdbg step -u "1 2" -l "ADD 3 EQUAL" -n 3
//! scriptdbg trace -u "1 2" -l "ADD 3 EQUAL" --json
//!
//! # Interactive session
//! scriptdbg debug --unlocking-file sig.txt --locking-file p2pkh.txt -b 2
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Script debugger
#[derive(Parser, Debug)]
#[command(name = "scriptdbg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log filter, e.g. `debug` or `scriptdbg_vm=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// List the instructions a script parses to
    Parse(commands::parse::ParseArgs),
    /// Run to completion or the first breakpoint
    Run(commands::ScriptArgs),
    /// Execute a fixed number of instructions
    Step(commands::run::StepArgs),
    /// Show the state after every instruction
    Trace(commands::ScriptArgs),
    /// Interactive debugging session
    Debug(commands::ScriptArgs),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the maximum arithmetic operand length
        #[arg(long)]
        set_max_num_len: Option<usize>,
        /// Set the maximum stack depth
        #[arg(long)]
        set_max_stack_size: Option<usize>,
        /// Set the default log filter
        #[arg(long)]
        set_log_level: Option<String>,
        /// Set whether JSON output is the default
        #[arg(long)]
        set_json: Option<bool>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Load config
    let mut config = Config::load();

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));
    tracing::debug!(?config, "configuration loaded");

    let json = cli.json || config.json;

    let result = match cli.command {
        Commands::Parse(args) => args.execute(json),
        Commands::Run(args) => commands::run::run(&args, &config, json),
        Commands::Step(args) => commands::run::step(&args, &config, json),
        Commands::Trace(args) => commands::run::trace_all(&args, &config, json),
        Commands::Debug(args) => commands::debug::execute(&args, &config),
        Commands::Config {
            show,
            set_max_num_len,
            set_max_stack_size,
            set_log_level,
            set_json,
        } => handle_config(
            &mut config,
            show,
            ConfigUpdate {
                max_num_len: set_max_num_len,
                max_stack_size: set_max_stack_size,
                log_level: set_log_level,
                json: set_json,
            },
            json,
        ),
    };

    if let Err(e) = result {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG` wins.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

struct ConfigUpdate {
    max_num_len: Option<usize>,
    max_stack_size: Option<usize>,
    log_level: Option<String>,
    json: Option<bool>,
}

fn handle_config(
    config: &mut Config,
    show: bool,
    update: ConfigUpdate,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(len) = update.max_num_len {
        if !(1..=8).contains(&len) {
            return Err(CliError::Config(format!(
                "max_num_len must be between 1 and 8, got {}",
                len
            )));
        }
        config.max_num_len = len;
        modified = true;
    }

    if let Some(size) = update.max_stack_size {
        if size == 0 {
            return Err(CliError::Config("max_stack_size must be positive".to_string()));
        }
        config.max_stack_size = size;
        modified = true;
    }

    if let Some(level) = update.log_level {
        EnvFilter::try_new(&level).map_err(|e| CliError::Config(e.to_string()))?;
        config.log_level = level;
        modified = true;
    }

    if let Some(enabled) = update.json {
        config.json = enabled;
        modified = true;
    }

    if modified {
        config.save()?;
        Output::new(json)
            .field("status", "saved")
            .message("Configuration saved")
            .print();
    } else if show {
        Output::new(json)
            .field("log_level", &config.log_level)
            .field_u64("max_num_len", config.max_num_len as u64)
            .field_u64("max_stack_size", config.max_stack_size as u64)
            .field_value("json", serde_json::Value::Bool(config.json))
            .message(&format!(
                "Log level: {}\nMax number length: {}\nMax stack size: {}\nJSON output: {}",
                config.log_level, config.max_num_len, config.max_stack_size, config.json
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-* options to modify")
            .print();
    }

    Ok(())
}
