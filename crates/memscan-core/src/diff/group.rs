//! Grouping of adjacent byte differences into regions.

use serde::Serialize;

use super::ByteDifference;

/// A run of consecutive differing bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ByteRegionDifference {
    pub offset: usize,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

impl ByteRegionDifference {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Offset one past the last byte of the region
    pub fn end(&self) -> usize {
        self.offset + self.a.len()
    }
}

/// Lazy iterator produced by [`group_diffs`].
pub struct GroupDiffs<I> {
    inner: I,
    pending: Option<ByteDifference>,
}

/// Merge an ascending sequence of differences into maximal runs of
/// strictly consecutive offsets. Any gap starts a new region.
pub fn group_diffs<I>(diffs: I) -> GroupDiffs<I::IntoIter>
where
    I: IntoIterator<Item = ByteDifference>,
{
    GroupDiffs {
        inner: diffs.into_iter(),
        pending: None,
    }
}

impl<I> Iterator for GroupDiffs<I>
where
    I: Iterator<Item = ByteDifference>,
{
    type Item = ByteRegionDifference;

    fn next(&mut self) -> Option<ByteRegionDifference> {
        let first = self.pending.take().or_else(|| self.inner.next())?;
        let mut region = ByteRegionDifference {
            offset: first.offset,
            a: vec![first.a],
            b: vec![first.b],
        };

        for d in self.inner.by_ref() {
            if d.offset != region.end() {
                self.pending = Some(d);
                break;
            }
            region.a.push(d.a);
            region.b.push(d.b);
        }

        Some(region)
    }
}
