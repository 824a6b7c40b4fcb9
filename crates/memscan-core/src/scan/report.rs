//! Round and session reports.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use super::{ScanMode, ScanState};
use crate::diff::ByteRegionDifference;
use crate::error::Result;
use crate::memory::MapIdentity;

/// A surviving candidate with its byte value in the latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Survivor {
    pub address: u64,
    pub offset: usize,
    pub value: u8,
}

/// A run of adjacent survivors that changed this round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedRegion {
    pub address: u64,
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

impl ChangedRegion {
    pub fn from_difference(base: u64, region: ByteRegionDifference) -> Self {
        Self {
            address: base + region.offset as u64,
            before: region.a,
            after: region.b,
        }
    }
}

/// Outcome of one scanning round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// 1-based: round 1 diffs against the baseline and seeds the set.
    /// The baseline snapshot itself (taken by `ScanSession::start`) is
    /// round 0 and produces no report.
    pub round: u32,
    pub mode: ScanMode,
    /// Offsets that changed among those compared
    pub changed: usize,
    pub surviving: usize,
    pub state: ScanState,
    /// Only listed once `surviving` is within the display limit
    pub survivors: Option<Vec<Survivor>>,
    pub changes: Option<Vec<ChangedRegion>>,
}

impl RoundReport {
    pub fn is_exhausted(&self) -> bool {
        self.surviving == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub mode: ScanMode,
    pub changed: usize,
    pub surviving: usize,
}

impl From<&RoundReport> for RoundSummary {
    fn from(report: &RoundReport) -> Self {
        Self {
            round: report.round,
            mode: report.mode,
            changed: report.changed,
            surviving: report.surviving,
        }
    }
}

/// Summary of a finished session, suitable for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub identity: MapIdentity,
    pub start: u64,
    pub end: u64,
    pub name: Option<String>,
    /// State the session was in when it ended
    pub state: ScanState,
    pub rounds: Vec<RoundSummary>,
    pub surviving: usize,
    /// Surviving addresses, listed only when within the display limit
    pub addresses: Option<Vec<u64>>,
    pub finished_at: DateTime<Local>,
}

impl ScanReport {
    pub fn region_label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.identity, name),
            None => self.identity.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, self.to_json()?)?;
        info!("Saved scan report to {}", path.as_ref().display());
        Ok(())
    }
}
