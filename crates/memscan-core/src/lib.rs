//! # memscan-core
//!
//! Core library for the memscan value scanner.
//!
//! This crate provides:
//! - Byte-level snapshot diffing, optionally restricted to candidate offsets
//! - Grouping of adjacent differences for display
//! - Process region model, procfs enumeration and raw read/write
//! - Round-based candidate scanning sessions
//! - Literal byte-sequence find/replace and printable-string extraction

pub mod config;
pub mod diff;
pub mod error;
pub mod memory;
pub mod scan;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use diff::{ByteDifference, ByteRegionDifference, diff, group_diffs};
pub use error::{Error, Result};
pub use memory::{
    MapIdentity, MemoryRegion, Permissions, ProcessHandle, ProcessMemory, find_sequence,
    parse_maps, printable_strings, replace_sequence,
};
pub use scan::{
    CandidateSet, ChangedRegion, RoundCommand, RoundReport, RoundSummary, ScanMode, ScanPrompter,
    ScanReport, ScanSession, ScanState, Snapshot, Survivor,
};
