//! CLI implementation of ScanPrompter for interactive scanning

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use memscan_core::{RoundCommand, RoundReport, ScanMode, ScanPrompter, ScanState};
use owo_colors::OwoColorize;

use crate::commands::hex_utils::format_hex_bytes;
use crate::shutdown::ShutdownSignal;

/// CLI prompter reading round commands from stdin
pub struct CliPrompter {
    shutdown: Arc<ShutdownSignal>,
}

impl CliPrompter {
    pub fn new(shutdown: Arc<ShutdownSignal>) -> Self {
        Self { shutdown }
    }
}

/// Parse one line of operator input.
///
/// Accepts the scan mode names and their short forms (`c`, `u`), and
/// `q`/`quit` to stop.
pub fn parse_command(input: &str) -> Option<RoundCommand> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return Some(RoundCommand::Quit);
    }
    input.parse::<ScanMode>().ok().map(RoundCommand::Advance)
}

impl ScanPrompter for CliPrompter {
    fn prompt_round(&self, round: u32, surviving: Option<usize>) -> RoundCommand {
        loop {
            match surviving {
                Some(n) => print!("[round {}, {} candidates] (c)hanged, (u)nchanged, (q)uit: ", round, n),
                None => print!("[round {}] (c)hanged, (u)nchanged, (q)uit: ", round),
            }
            io::stdout().flush().ok();

            let stdin = io::stdin();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                // EOF
                Ok(0) => return RoundCommand::Quit,
                Ok(_) => {}
                Err(_) => {
                    eprintln!("Failed to read input, please try again");
                    continue;
                }
            }

            if self.shutdown.is_shutdown() {
                return RoundCommand::Quit;
            }

            match parse_command(&line) {
                Some(command) => return command,
                None => eprintln!("Unknown command {:?}, expected c, u or q", line.trim()),
            }
        }
    }

    fn display_round(&self, report: &RoundReport) {
        let state = match report.state {
            ScanState::Converged => report.state.green().to_string(),
            ScanState::Exhausted => report.state.red().to_string(),
            _ => report.state.to_string(),
        };
        println!(
            "Round {} ({}): {} changed, {} surviving [{}]",
            report.round,
            report.mode,
            report.changed,
            report.surviving.bold(),
            state
        );

        if let Some(changes) = &report.changes {
            for change in changes {
                println!(
                    "  0x{:X}: {} -> {}",
                    change.address,
                    format_hex_bytes(&change.before).dimmed(),
                    format_hex_bytes(&change.after).yellow()
                );
            }
        }

        if let Some(survivors) = &report.survivors {
            for survivor in survivors {
                println!(
                    "  0x{:X} (+0x{:X}) = {:02X} ({})",
                    survivor.address, survivor.offset, survivor.value, survivor.value
                );
            }
        }
    }

    fn display_message(&self, message: &str) {
        println!("{}", message);
    }
}
