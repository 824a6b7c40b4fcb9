//! Region selection shared by the region-oriented commands.

use anyhow::{Result, bail};
use memscan_core::{MapIdentity, MemoryRegion, ProcessHandle, ProcessMemory};

use super::hex_utils::parse_hex_address;
use crate::RegionSelector;

/// Open the process and pick one region from a fresh enumeration.
pub fn open_region(pid: u32, selector: &RegionSelector) -> Result<(ProcessHandle, MemoryRegion)> {
    let process = ProcessHandle::open(pid)?;
    println!(
        "Found process (PID: {}, Name: {})",
        process.pid,
        process.name().unwrap_or_else(|| "?".to_string())
    );

    let regions = process.list_regions()?;
    let region = select_region(&regions, selector)?;
    println!("Region: {}", region);
    Ok((process, region))
}

pub fn select_region(regions: &[MemoryRegion], selector: &RegionSelector) -> Result<MemoryRegion> {
    let matches: Vec<&MemoryRegion> = if let Some(ref id) = selector.region {
        let identity: MapIdentity = id.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        regions.iter().filter(|r| r.identity() == identity).collect()
    } else if let Some(ref name) = selector.name {
        regions.iter().filter(|r| r.is_named(name)).collect()
    } else if let Some(ref address) = selector.address {
        let address = parse_hex_address(address)?;
        regions.iter().filter(|r| r.contains(address)).collect()
    } else {
        bail!("No region specified. Use --region, --name, or --address");
    };

    match matches.as_slice() {
        [] => bail!("No region matches the selection"),
        [region] => Ok((*region).clone()),
        many => {
            let listing = many
                .iter()
                .map(|r| format!("  {}", r))
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "{} regions match the selection, use --address to pick one:\n{}",
                many.len(),
                listing
            )
        }
    }
}
