//! Round-based candidate scanning.
//!
//! A session watches one region. Each round takes a fresh snapshot, diffs
//! it against the previous one and narrows the candidate set:
//!
//! - the first round seeds the set from an unrestricted diff,
//! - later rounds only compare the surviving candidates,
//! - [`ScanMode::MatchOnChange`] keeps candidates that changed,
//!   [`ScanMode::MatchOnUnchanged`] keeps candidates that did not.
//!
//! The set never grows. Running out of candidates ends the session as
//! [`ScanState::Exhausted`], which is a result rather than an error.
//!
//! ```ignore
//! let region = process.find_region(start, end)?.unwrap();
//! let mut session = ScanSession::start(&process, &region, ScanConfig::default())?;
//! // ... the tracked value changes ...
//! session.advance_round(ScanMode::MatchOnChange)?;
//! // ... it stays the same ...
//! let report = session.advance_round(ScanMode::MatchOnUnchanged)?;
//! println!("{} candidates left", report.surviving);
//! let summary = session.end();
//! ```

mod candidates;
mod prompter;
mod report;

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::diff::{ByteDifference, diff, group_diffs};
use crate::error::{Error, Result};
use crate::memory::{MemoryRegion, ProcessMemory};

pub use candidates::CandidateSet;
pub use prompter::{RoundCommand, ScanPrompter};
pub use report::{ChangedRegion, RoundReport, RoundSummary, ScanReport, Survivor};

/// How the operator says the tracked value behaved since the last snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[strum(to_string = "changed", serialize = "c", serialize = "change")]
    MatchOnChange,
    #[strum(to_string = "unchanged", serialize = "u", serialize = "same")]
    MatchOnUnchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// Baseline taken, no candidates yet
    Empty,
    /// First diff seeded the candidate set
    Seeded,
    Refining,
    /// At most `converge_at` candidates remain
    Converged,
    /// No candidate survived
    Exhausted,
    Terminated,
}

impl ScanState {
    pub fn is_finished(self) -> bool {
        matches!(self, ScanState::Exhausted | ScanState::Terminated)
    }
}

/// A point-in-time copy of a region's bytes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub base: u64,
    pub data: Vec<u8>,
}

impl Snapshot {
    pub fn take<M: ProcessMemory + ?Sized>(memory: &M, region: &MemoryRegion) -> Result<Self> {
        Ok(Self {
            base: region.start,
            data: memory.read_region(region)?,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct ScanSession<'a, M: ProcessMemory + ?Sized> {
    memory: &'a M,
    region: MemoryRegion,
    config: ScanConfig,
    previous: Snapshot,
    candidates: Option<CandidateSet>,
    state: ScanState,
    round: u32,
    history: Vec<RoundSummary>,
}

impl<'a, M: ProcessMemory + ?Sized> ScanSession<'a, M> {
    /// Start a session by taking the baseline snapshot of `region`.
    pub fn start(memory: &'a M, region: &MemoryRegion, config: ScanConfig) -> Result<Self> {
        let previous = Snapshot::take(memory, region)?;
        info!(
            "Scan session started on region {} (0x{:x}-0x{:x}, {} bytes)",
            region.identity(),
            region.start,
            region.end,
            region.size()
        );

        Ok(Self {
            memory,
            region: region.clone(),
            config,
            previous,
            candidates: None,
            state: ScanState::Empty,
            round: 0,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Number of completed rounds. The baseline counts as round 0, so the
    /// seeding round reports as round 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn region(&self) -> &MemoryRegion {
        &self.region
    }

    pub fn candidates(&self) -> Option<&CandidateSet> {
        self.candidates.as_ref()
    }

    pub fn surviving(&self) -> Option<usize> {
        self.candidates.as_ref().map(CandidateSet::len)
    }

    pub fn history(&self) -> &[RoundSummary] {
        &self.history
    }

    /// Absolute addresses of the current candidates
    pub fn addresses(&self) -> Vec<u64> {
        self.candidates
            .as_ref()
            .map(|c| c.addresses(self.region.start).collect())
            .unwrap_or_default()
    }

    /// Take the next snapshot and refine the candidate set.
    ///
    /// Any failure to obtain the snapshot ends the session; a new session
    /// has to be started against a freshly enumerated region.
    pub fn advance_round(&mut self, mode: ScanMode) -> Result<RoundReport> {
        if self.state.is_finished() {
            return Err(Error::SessionFinished(self.state.to_string()));
        }

        let current = match self.take_next_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Scan session on {} terminated: {}", self.region.identity(), e);
                self.state = ScanState::Terminated;
                return Err(e);
            }
        };

        // A set stored as an exclusion list is compared in full and filtered
        let restriction = self.candidates.as_ref().and_then(CandidateSet::as_offsets);
        let mut differences: Vec<ByteDifference> =
            diff(&self.previous.data, &current.data, restriction)?.collect();
        if restriction.is_none()
            && let Some(candidates) = &self.candidates
        {
            differences.retain(|d| candidates.contains(d.offset));
        }
        let changed: Vec<usize> = differences.iter().map(|d| d.offset).collect();

        let refined = match &self.candidates {
            None => CandidateSet::seed(mode, current.len(), &changed),
            Some(previous) => previous.refine(mode, &changed),
        };
        debug_assert!(
            self.candidates
                .as_ref()
                .is_none_or(|previous| refined.len() <= previous.len())
        );

        self.round += 1;
        self.state = if refined.is_empty() {
            ScanState::Exhausted
        } else if refined.len() <= self.config.converge_at {
            ScanState::Converged
        } else if self.candidates.is_none() {
            ScanState::Seeded
        } else {
            ScanState::Refining
        };

        let report = self.build_report(mode, &differences, &refined, &current);
        info!(
            "Round {} ({}): {} changed, {} surviving, {}",
            report.round, mode, report.changed, report.surviving, report.state
        );

        self.history.push(RoundSummary::from(&report));
        self.candidates = Some(refined);
        self.previous = current;
        Ok(report)
    }

    /// End the session and summarize it.
    pub fn end(mut self) -> ScanReport {
        let state = self.state;
        self.state = ScanState::Terminated;
        info!(
            "Scan session on {} ended after {} round(s) ({})",
            self.region.identity(),
            self.round,
            state
        );

        let surviving = self.surviving().unwrap_or(0);
        let addresses = (self.candidates.is_some() && surviving <= self.config.display_limit)
            .then(|| self.addresses());

        ScanReport {
            identity: self.region.identity(),
            start: self.region.start,
            end: self.region.end,
            name: self.region.name.clone(),
            state,
            rounds: std::mem::take(&mut self.history),
            surviving,
            addresses,
            finished_at: Local::now(),
        }
    }

    /// Drive rounds from `prompter` until the session converges, runs out
    /// of candidates, reaches `max_rounds`, or the operator quits.
    ///
    /// `cancel` is only checked at round boundaries.
    pub fn run<P: ScanPrompter + ?Sized>(
        &mut self,
        prompter: &P,
        cancel: &AtomicBool,
    ) -> Result<ScanState> {
        loop {
            if cancel.load(Ordering::SeqCst) {
                debug!("Scan cancelled at round {}", self.round);
                break;
            }

            match self.state {
                ScanState::Exhausted => {
                    prompter.display_message(
                        "No candidate survived. Start a new scan to try again.",
                    );
                    break;
                }
                ScanState::Converged => {
                    prompter.display_message("Candidate set converged.");
                    break;
                }
                ScanState::Terminated => break,
                _ => {}
            }

            if self.config.max_rounds > 0 && self.round >= self.config.max_rounds {
                prompter.display_message(&format!(
                    "Reached the round limit ({}).",
                    self.config.max_rounds
                ));
                break;
            }

            let mode = match prompter.prompt_round(self.round + 1, self.surviving()) {
                RoundCommand::Advance(mode) => mode,
                RoundCommand::Quit => break,
            };

            if cancel.load(Ordering::SeqCst) {
                debug!("Scan cancelled at round {}", self.round);
                break;
            }

            let report = self.advance_round(mode)?;
            prompter.display_round(&report);
        }

        Ok(self.state)
    }

    /// Re-enumerate the region and snapshot it, checking that its shape
    /// still matches the session's baseline.
    fn take_next_snapshot(&self) -> Result<Snapshot> {
        let regions = self.memory.list_regions()?;
        let region = regions
            .iter()
            .find(|r| r.contains(self.region.start))
            .ok_or_else(|| self.region_changed("region is no longer mapped".to_string()))?;

        if !region.same_bounds(&self.region) {
            return Err(self.region_changed(format!(
                "now reported as 0x{:x}-0x{:x}",
                region.start, region.end
            )));
        }

        let snapshot = Snapshot::take(self.memory, region)?;
        if snapshot.len() != self.previous.len() {
            return Err(self.region_changed(format!(
                "read {} bytes, previous snapshot had {}",
                snapshot.len(),
                self.previous.len()
            )));
        }
        Ok(snapshot)
    }

    fn region_changed(&self, reason: String) -> Error {
        Error::RegionChanged {
            start: self.region.start,
            end: self.region.end,
            reason,
        }
    }

    fn build_report(
        &self,
        mode: ScanMode,
        differences: &[ByteDifference],
        refined: &CandidateSet,
        current: &Snapshot,
    ) -> RoundReport {
        let base = self.region.start;
        let within_limit = refined.len() <= self.config.display_limit;

        let survivors = within_limit.then(|| {
            refined
                .iter()
                .map(|offset| Survivor {
                    address: base + offset as u64,
                    offset,
                    value: current.data[offset],
                })
                .collect()
        });

        let changes = within_limit.then(|| {
            let kept = differences
                .iter()
                .copied()
                .filter(|d| refined.contains(d.offset));
            group_diffs(kept)
                .map(|region| ChangedRegion::from_difference(base, region))
                .collect()
        });

        RoundReport {
            round: self.round,
            mode,
            changed: differences.len(),
            surviving: refined.len(),
            state: self.state,
            survivors,
            changes,
        }
    }
}
