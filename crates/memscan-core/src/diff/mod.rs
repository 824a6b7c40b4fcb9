//! Byte-level comparison of two snapshots.
//!
//! [`diff`] walks two equal-length buffers and yields every differing byte
//! in ascending offset order. When a restriction set is supplied only those
//! offsets are inspected, so the cost of a round depends on the number of
//! surviving candidates rather than on the size of the region.
//!
//! [`group_diffs`] merges runs of adjacent differences into regions for
//! display.

mod group;

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub use group::{ByteRegionDifference, GroupDiffs, group_diffs};

/// Chunk size used to skip identical stretches in unrestricted mode
const SKIP_CHUNK: usize = 64;

/// A single differing byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteDifference {
    pub offset: usize,
    pub a: u8,
    pub b: u8,
}

/// Iterator over the differences between two buffers.
///
/// Created by [`diff`]. Yields offsets in strictly ascending order.
pub struct ByteDiff<'a> {
    a: &'a [u8],
    b: &'a [u8],
    mode: DiffMode<'a>,
}

enum DiffMode<'a> {
    Identical,
    Full { pos: usize },
    Restricted { offsets: Cow<'a, [usize]>, pos: usize },
}

/// Compare `a` against `b`, optionally only at the offsets in `restriction`.
///
/// `restriction` is treated as a set: order and duplicates do not matter,
/// and differences are always yielded in ascending offset order. A
/// [`crate::CandidateSet`] is already sorted and is used without copying.
/// An empty restriction means no restriction.
pub fn diff<'a>(a: &'a [u8], b: &'a [u8], restriction: Option<&'a [usize]>) -> Result<ByteDiff<'a>> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mode = match restriction {
        Some(offsets) if !offsets.is_empty() => {
            if let Some(&outside) = offsets.iter().find(|&&offset| offset >= a.len()) {
                return Err(Error::OutOfRange {
                    address: outside as u64,
                    len: 1,
                    start: 0,
                    end: a.len() as u64,
                });
            }
            let offsets = if offsets.windows(2).all(|w| w[0] < w[1]) {
                Cow::Borrowed(offsets)
            } else {
                let mut sorted = offsets.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                Cow::Owned(sorted)
            };
            debug!(
                "Restricted diff over {} of {} offsets",
                offsets.len(),
                a.len()
            );
            DiffMode::Restricted { offsets, pos: 0 }
        }
        _ if a == b => {
            debug!("Buffers identical ({} bytes)", a.len());
            DiffMode::Identical
        }
        _ => {
            debug!("Full diff over {} bytes", a.len());
            DiffMode::Full { pos: 0 }
        }
    };

    Ok(ByteDiff { a, b, mode })
}

impl Iterator for ByteDiff<'_> {
    type Item = ByteDifference;

    fn next(&mut self) -> Option<ByteDifference> {
        let (a, b) = (self.a, self.b);
        match &mut self.mode {
            DiffMode::Identical => None,
            DiffMode::Full { pos } => {
                while *pos < a.len() {
                    let i = *pos;
                    if i % SKIP_CHUNK == 0
                        && i + SKIP_CHUNK <= a.len()
                        && a[i..i + SKIP_CHUNK] == b[i..i + SKIP_CHUNK]
                    {
                        *pos += SKIP_CHUNK;
                        continue;
                    }
                    *pos += 1;
                    if a[i] != b[i] {
                        return Some(ByteDifference {
                            offset: i,
                            a: a[i],
                            b: b[i],
                        });
                    }
                }
                None
            }
            DiffMode::Restricted { offsets, pos } => {
                while let Some(&i) = offsets.get(*pos) {
                    *pos += 1;
                    if a[i] != b[i] {
                        return Some(ByteDifference {
                            offset: i,
                            a: a[i],
                            b: b[i],
                        });
                    }
                }
                None
            }
        }
    }
}
