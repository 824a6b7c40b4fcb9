use std::iter::Peekable;
use std::slice;

use super::ScanMode;

/// Region-relative offsets still believed to hold the tracked value.
///
/// Iteration is always ascending without duplicates. A set seeded from
/// the unchanged bytes of a whole region is stored as "everything except
/// the offsets that changed", so its size follows the number of changes
/// rather than the size of the region.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    /// Explicit offsets, sorted and deduplicated
    Offsets(Vec<usize>),
    /// Every offset in `0..len` except `excluded` (sorted, deduplicated,
    /// all below `len`)
    AllExcept { len: usize, excluded: Vec<usize> },
}

impl Default for CandidateSet {
    fn default() -> Self {
        Self {
            repr: Repr::Offsets(Vec::new()),
        }
    }
}

impl PartialEq for CandidateSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for CandidateSet {}

impl CandidateSet {
    pub fn from_offsets<I: IntoIterator<Item = usize>>(offsets: I) -> Self {
        let mut offsets: Vec<usize> = offsets.into_iter().collect();
        offsets.sort_unstable();
        offsets.dedup();
        Self {
            repr: Repr::Offsets(offsets),
        }
    }

    /// Every offset in `0..len` except those in `excluded`.
    pub fn complement(len: usize, excluded: &[usize]) -> Self {
        let mut excluded: Vec<usize> = excluded.iter().copied().filter(|&e| e < len).collect();
        excluded.sort_unstable();
        excluded.dedup();
        Self {
            repr: Repr::AllExcept { len, excluded },
        }
        .compacted()
    }

    /// Seed a set from the first round's changed offsets.
    pub fn seed(mode: ScanMode, len: usize, changed: &[usize]) -> Self {
        match mode {
            ScanMode::MatchOnChange => Self::from_offsets(changed.iter().copied()),
            ScanMode::MatchOnUnchanged => Self::complement(len, changed),
        }
    }

    /// Narrow the set by this round's changed offsets (ascending).
    ///
    /// The result is always a subset of `self`.
    pub fn refine(&self, mode: ScanMode, changed: &[usize]) -> Self {
        let keep_changed = mode == ScanMode::MatchOnChange;
        match &self.repr {
            Repr::AllExcept { len, excluded } if !keep_changed => {
                // Still everything except what has changed so far
                let mut merged = Vec::with_capacity(excluded.len() + changed.len());
                let mut left = excluded.iter().copied().peekable();
                let mut right = changed.iter().copied().filter(|&c| c < *len).peekable();
                loop {
                    let next = match (left.peek().copied(), right.peek().copied()) {
                        (Some(l), Some(r)) if l < r => left.next(),
                        (Some(l), Some(r)) if r < l => right.next(),
                        (Some(_), Some(_)) => {
                            right.next();
                            left.next()
                        }
                        (Some(_), None) => left.next(),
                        (None, Some(_)) => right.next(),
                        (None, None) => break,
                    };
                    merged.extend(next);
                }
                Self {
                    repr: Repr::AllExcept {
                        len: *len,
                        excluded: merged,
                    },
                }
                .compacted()
            }
            Repr::AllExcept { .. } => {
                Self::from_offsets(changed.iter().copied().filter(|&c| self.contains(c)))
            }
            Repr::Offsets(_) => {
                let mut changed = changed.iter().peekable();
                let offsets = self
                    .iter()
                    .filter(|&offset| {
                        while changed.next_if(|&&c| c < offset).is_some() {}
                        let did_change = changed.peek().is_some_and(|&&c| c == offset);
                        did_change == keep_changed
                    })
                    .collect();
                Self {
                    repr: Repr::Offsets(offsets),
                }
            }
        }
    }

    /// Switch to explicit offsets once they take less room than the
    /// exclusion list.
    fn compacted(self) -> Self {
        let compact = matches!(
            &self.repr,
            Repr::AllExcept { excluded, .. } if self.len() <= excluded.len()
        );
        if compact {
            Self {
                repr: Repr::Offsets(self.iter().collect()),
            }
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Offsets(offsets) => offsets.len(),
            Repr::AllExcept { len, excluded } => len - excluded.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        match &self.repr {
            Repr::Offsets(offsets) => offsets.binary_search(&offset).is_ok(),
            Repr::AllExcept { len, excluded } => {
                offset < *len && excluded.binary_search(&offset).is_err()
            }
        }
    }

    /// The explicit offsets, when the set is stored that way. Usable as a
    /// [`crate::diff::diff`] restriction as is.
    pub fn as_offsets(&self) -> Option<&[usize]> {
        match &self.repr {
            Repr::Offsets(offsets) => Some(offsets.as_slice()),
            Repr::AllExcept { .. } => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        match &self.repr {
            Repr::Offsets(offsets) => Iter::Offsets(offsets.iter()),
            Repr::AllExcept { len, excluded } => Iter::AllExcept {
                next: 0,
                len: *len,
                excluded: excluded.iter().peekable(),
            },
        }
    }

    /// Absolute addresses for a region starting at `base`
    pub fn addresses(&self, base: u64) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(move |offset| base + offset as u64)
    }
}

enum Iter<'a> {
    Offsets(slice::Iter<'a, usize>),
    AllExcept {
        next: usize,
        len: usize,
        excluded: Peekable<slice::Iter<'a, usize>>,
    },
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Iter::Offsets(offsets) => offsets.next().copied(),
            Iter::AllExcept {
                next,
                len,
                excluded,
            } => {
                while *next < *len {
                    let offset = *next;
                    *next += 1;
                    if excluded.next_if_eq(&&offset).is_none() {
                        return Some(offset);
                    }
                }
                None
            }
        }
    }
}
