//! Interactive debugger

use crate::{
    commands::ScriptArgs,
    config::Config,
    output::{format_snapshot, format_status},
    CliError,
};
use scriptdbg_stepper::{
    find_next_breakpoint, restart, run_to_completion, run_to_next_breakpoint, step_once,
    toggle_breakpoint, Snapshot,
};
use std::io::{BufRead, Write};

const PROMPT: &str = "(scriptdbg) ";

const HELP: &str = "\
s, step [n]     execute n instructions (default 1)
c, continue     run to the next breakpoint
r, run          run to completion or a breakpoint
b, break <i>    toggle a breakpoint at instruction i
n, next         show the next breakpoint
p, print        show program and stacks
reset           start over, keeping breakpoints
h, help         show this help
q, quit         exit";

/// Start an interactive session on stdin/stdout
pub fn execute(args: &ScriptArgs, config: &Config) -> Result<(), CliError> {
    let snapshot = args.session(config)?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    repl(snapshot, stdin.lock(), &mut stdout)?;
    Ok(())
}

/// Read commands until `quit` or end of input, returning the final snapshot
pub fn repl<R: BufRead, W: Write>(
    mut snapshot: Snapshot,
    input: R,
    out: &mut W,
) -> Result<Snapshot, CliError> {
    writeln!(out, "{}", format_snapshot(&snapshot.view()))?;
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
            continue;
        };
        let argument = words.next();

        match command {
            "s" | "step" => {
                let count = match argument.map(str::parse::<usize>) {
                    None => 1,
                    Some(Ok(count)) => count,
                    Some(Err(_)) => {
                        writeln!(out, "invalid step count")?;
                        write!(out, "{}", PROMPT)?;
                        out.flush()?;
                        continue;
                    }
                };
                for _ in 0..count {
                    if snapshot.is_complete() {
                        break;
                    }
                    snapshot = step_once(snapshot);
                }
                writeln!(out, "{}", format_status(&snapshot.step_view()))?;
            }
            "c" | "continue" => {
                snapshot = run_to_next_breakpoint(snapshot);
                writeln!(out, "{}", format_status(&snapshot.step_view()))?;
            }
            "r" | "run" => {
                snapshot = run_to_completion(snapshot);
                writeln!(out, "{}", format_status(&snapshot.step_view()))?;
            }
            "b" | "break" => match argument.map(str::parse::<usize>) {
                Some(Ok(index)) if snapshot.is_complete() => {
                    writeln!(out, "session complete, reset to change breakpoint {}", index)?;
                }
                Some(Ok(index)) => {
                    snapshot = toggle_breakpoint(snapshot, index);
                    let state = if snapshot.breakpoints().contains(&index) {
                        "set"
                    } else {
                        "cleared"
                    };
                    writeln!(out, "breakpoint {} {}", state, index)?;
                }
                _ => writeln!(out, "usage: break <index>")?,
            },
            "n" | "next" => match find_next_breakpoint(&snapshot) {
                Some(index) => writeln!(out, "next breakpoint at {}", index)?,
                None => writeln!(out, "no breakpoint ahead")?,
            },
            "p" | "print" => writeln!(out, "{}", format_snapshot(&snapshot.view()))?,
            "reset" => {
                snapshot = restart(&snapshot);
                writeln!(out, "{}", format_status(&snapshot.step_view()))?;
            }
            "h" | "help" => writeln!(out, "{}", HELP)?,
            "q" | "quit" => return Ok(snapshot),
            other => writeln!(out, "unknown command '{}', try 'help'", other)?,
        }

        write!(out, "{}", PROMPT)?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptdbg_stepper::{initialize_text, Status};
    use std::io::Cursor;

    fn session(commands: &str) -> (Snapshot, String) {
        let snapshot = initialize_text("1 2", "ADD 3 EQUAL").unwrap();
        let mut out = Vec::new();
        let snapshot = repl(snapshot, Cursor::new(commands.to_string()), &mut out).unwrap();
        (snapshot, String::from_utf8(out).unwrap())
    }

    // ==================== Commands ====================

    #[test]
    fn test_step_commands() {
        let (snapshot, out) = session("s\nstep 2\nq\n");
        assert_eq!(snapshot.pc(), 3);
        assert!(out.contains("pc 1 (unlocking) running"));
        assert!(out.contains("pc 3 (locking) running top=03"));
    }

    #[test]
    fn test_break_and_continue() {
        let (snapshot, out) = session("b 3\nn\nc\n");
        assert_eq!(snapshot.pc(), 3);
        assert_eq!(snapshot.status(), Status::Paused);
        assert!(out.contains("breakpoint set 3"));
        assert!(out.contains("next breakpoint at 3"));
        assert!(out.contains("pc 3 (locking) paused"));
    }

    #[test]
    fn test_toggle_clears() {
        let (snapshot, out) = session("b 1\nbreak 1\n");
        assert!(snapshot.breakpoints().is_empty());
        assert!(out.contains("breakpoint cleared 1"));
    }

    #[test]
    fn test_run_to_completion() {
        let (snapshot, out) = session("r\n");
        assert!(snapshot.is_valid());
        assert!(out.contains("complete, valid"));
    }

    #[test]
    fn test_break_after_completion() {
        let (snapshot, out) = session("r\nb 2\n");
        assert!(snapshot.breakpoints().is_empty());
        assert!(out.contains("session complete"));
    }

    #[test]
    fn test_reset_keeps_breakpoints() {
        let (snapshot, _) = session("b 4\nr\nr\nreset\n");
        assert_eq!(snapshot.pc(), 0);
        assert!(!snapshot.is_complete());
        assert!(snapshot.breakpoints().contains(&4));
    }

    #[test]
    fn test_bad_input() {
        let (snapshot, out) = session("\nfrobnicate\nb x\ns many\n");
        assert_eq!(snapshot.pc(), 0);
        assert!(out.contains("unknown command 'frobnicate'"));
        assert!(out.contains("usage: break <index>"));
        assert!(out.contains("invalid step count"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let (snapshot, _) = session("q\nr\n");
        assert_eq!(snapshot.pc(), 0);
    }

    #[test]
    fn test_print_and_help() {
        let (_, out) = session("p\nh\n");
        assert!(out.contains("main: []"));
        assert!(out.contains("toggle a breakpoint"));
    }
}
