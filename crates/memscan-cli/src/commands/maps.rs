//! Maps command implementation.

use anyhow::Result;
use memscan_core::{ProcessHandle, ProcessMemory};

/// Run the maps command
pub fn run(pid: u32, writable_only: bool, name_filter: Option<&str>) -> Result<()> {
    let process = ProcessHandle::open(pid)?;
    let regions = process.list_regions()?;

    println!(
        "Regions of PID {} ({}):",
        process.pid,
        process.name().unwrap_or_else(|| "?".to_string())
    );
    println!();
    println!(
        "{:<8} {:<25} {:<4} {:>10} NAME",
        "ID", "RANGE", "PERM", "SIZE"
    );

    let mut shown = 0usize;
    for region in regions
        .iter()
        .filter(|r| !writable_only || r.perms.write)
        .filter(|r| match name_filter {
            Some(filter) => r.name.as_deref().is_some_and(|n| n.contains(filter)),
            None => true,
        })
    {
        println!("{}", region);
        shown += 1;
    }

    println!();
    println!("{} of {} region(s)", shown, regions.len());
    Ok(())
}
