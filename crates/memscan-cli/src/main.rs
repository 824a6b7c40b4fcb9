mod commands;
mod prompter;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memscan")]
#[command(about = "Locate changing values in a running process's memory")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Which region of the process to operate on
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct RegionSelector {
    /// Region identity as printed by `maps`
    #[arg(long)]
    pub region: Option<String>,

    /// Region name, e.g. "[heap]" or a library path
    #[arg(long)]
    pub name: Option<String>,

    /// Any address inside the region (hex)
    #[arg(long)]
    pub address: Option<String>,
}

/// A literal byte sequence
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SequenceArgs {
    /// UTF-8 text
    #[arg(long)]
    pub string: Option<String>,

    /// Hex bytes, e.g. "DE AD BE EF"
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the process's memory regions
    Maps {
        #[arg(short, long)]
        pid: u32,

        /// Only show writable regions
        #[arg(long)]
        writable: bool,

        /// Only show regions whose name contains this text
        #[arg(long)]
        name: Option<String>,
    },
    /// Interactively narrow down the address of a changing value
    Scan {
        #[arg(short, long)]
        pid: u32,

        #[command(flatten)]
        selector: RegionSelector,

        /// TOML scan configuration
        #[arg(short, long, env = "MEMSCAN_CONFIG")]
        config: Option<PathBuf>,

        /// Write the final report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Hexdump memory at an address
    Hexdump {
        #[arg(short, long)]
        pid: u32,

        /// Start address (hex)
        #[arg(short, long)]
        address: String,

        #[arg(short, long, default_value_t = 256)]
        size: usize,

        /// Show ASCII column
        #[arg(long)]
        ascii: bool,
    },
    /// Find every occurrence of a byte sequence in a region
    Find {
        #[arg(short, long)]
        pid: u32,

        #[command(flatten)]
        selector: RegionSelector,

        #[command(flatten)]
        sequence: SequenceArgs,

        /// Maximum number of results to print
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Replace every occurrence of a byte sequence in a region
    Replace {
        #[arg(short, long)]
        pid: u32,

        #[command(flatten)]
        selector: RegionSelector,

        #[command(flatten)]
        sequence: SequenceArgs,

        /// Replacement text (UTF-8)
        #[arg(long, conflicts_with = "with_hex")]
        with: Option<String>,

        /// Replacement bytes (hex)
        #[arg(long)]
        with_hex: Option<String>,
    },
    /// Print printable strings found in a region
    Strings {
        #[arg(short, long)]
        pid: u32,

        #[command(flatten)]
        selector: RegionSelector,

        /// Minimum string length
        #[arg(long)]
        min: Option<usize>,
    },
    /// Calculate offset between two addresses
    Offset {
        /// From address (hex)
        from: String,
        /// To address (hex)
        to: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "memscan=debug" } else { "memscan=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Maps {
            pid,
            writable,
            name,
        } => commands::maps::run(pid, writable, name.as_deref()),
        Command::Scan {
            pid,
            selector,
            config,
            output,
        } => commands::scan::run(pid, &selector, config.as_deref(), output.as_deref()),
        Command::Hexdump {
            pid,
            address,
            size,
            ascii,
        } => commands::hexdump::run(pid, &address, size, ascii),
        Command::Find {
            pid,
            selector,
            sequence,
            limit,
        } => commands::find::run(pid, &selector, &sequence, limit),
        Command::Replace {
            pid,
            selector,
            sequence,
            with,
            with_hex,
        } => commands::replace::run(pid, &selector, &sequence, with, with_hex),
        Command::Strings { pid, selector, min } => commands::strings::run(pid, &selector, min),
        Command::Offset { from, to } => commands::offset::run(&from, &to),
    }
}
