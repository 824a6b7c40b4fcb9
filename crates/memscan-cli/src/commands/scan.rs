//! Interactive scan command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use memscan_core::{ScanConfig, ScanSession};
use tracing::{info, warn};

use super::select::open_region;
use crate::RegionSelector;
use crate::prompter::CliPrompter;
use crate::shutdown::ShutdownSignal;

/// Run the scan command
pub fn run(
    pid: u32,
    selector: &RegionSelector,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            let config = ScanConfig::load(path)?;
            info!("Loaded scan config from {}", path.display());
            config
        }
        None => ScanConfig::default(),
    };

    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping after this round...");
        shutdown_ctrlc.trigger();
    })?;

    let (process, region) = open_region(pid, selector)?;
    let mut session = ScanSession::start(&process, &region, config)?;
    println!(
        "Baseline taken ({} bytes). Change the value in the target, then answer each prompt.",
        region.size()
    );

    let prompter = CliPrompter::new(Arc::clone(&shutdown));
    let outcome = session.run(&prompter, shutdown.as_atomic());
    if let Err(ref e) = outcome {
        warn!("Scan ended early: {}", e);
    }

    let report = session.end();
    println!();
    println!(
        "Region {}: {} after {} round(s), {} candidate(s) left",
        report.region_label(),
        report.state,
        report.rounds.len(),
        report.surviving
    );
    if let Some(addresses) = &report.addresses {
        for address in addresses {
            println!("  0x{:X}", address);
        }
    }

    if let Some(path) = output {
        report.save(path)?;
        println!("Report written to {}", path.display());
    }

    outcome?;
    Ok(())
}
