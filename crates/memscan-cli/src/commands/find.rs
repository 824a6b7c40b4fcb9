//! Find command implementation.

use anyhow::Result;
use memscan_core::{ProcessMemory, find_sequence};

use super::hex_utils::{format_hex_bytes, sequence_bytes};
use super::select::open_region;
use crate::{RegionSelector, SequenceArgs};

/// Run the find command
pub fn run(pid: u32, selector: &RegionSelector, sequence: &SequenceArgs, limit: usize) -> Result<()> {
    let needle = sequence_bytes(sequence)?;
    let (process, region) = open_region(pid, selector)?;

    let data = process.read_region(&region)?;
    let matches = find_sequence(&data, region.start, &needle);

    println!("Searching for {}", format_hex_bytes(&needle));
    println!();
    for address in matches.iter().take(limit) {
        println!("  0x{:X} (+0x{:X})", address, address - region.start);
    }
    if matches.len() > limit {
        println!("  ... {} more", matches.len() - limit);
    }

    println!();
    println!("{} match(es)", matches.len());
    Ok(())
}
