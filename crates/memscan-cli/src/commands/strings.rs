//! Strings command implementation.

use anyhow::Result;
use memscan_core::{ProcessMemory, ScanConfig, printable_strings};

use super::select::open_region;
use crate::RegionSelector;

/// Run the strings command
pub fn run(pid: u32, selector: &RegionSelector, min_len: Option<usize>) -> Result<()> {
    let min_len = min_len.unwrap_or(ScanConfig::default().min_string_len);
    let (process, region) = open_region(pid, selector)?;

    let data = process.read_region(&region)?;
    let mut count = 0usize;
    for (offset, text) in printable_strings(&data, min_len) {
        println!("0x{:X}: {}", region.start + offset as u64, text.escape_debug());
        count += 1;
    }

    println!();
    println!("{} string(s) of at least {} characters", count, min_len);
    Ok(())
}
