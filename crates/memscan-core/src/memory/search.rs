//! Literal byte-sequence search and printable-string extraction.

use memchr::memmem;
use tracing::{debug, info};

use super::reader::ProcessMemory;
use super::region::MemoryRegion;
use crate::error::Result;

/// Absolute addresses of every non-overlapping occurrence of `needle` in
/// `data`, scanning left to right. `base` is the address of `data[0]`.
pub fn find_sequence(data: &[u8], base: u64, needle: &[u8]) -> Vec<u64> {
    if needle.is_empty() {
        return Vec::new();
    }
    memmem::find_iter(data, needle)
        .map(|pos| base + pos as u64)
        .collect()
}

/// Overwrite every occurrence of `needle` in `region` with `replacement`.
///
/// Matches are located in a single snapshot taken before any write. Each
/// write is bounds- and permission-checked, so a replacement that would
/// run past the region end fails with `OutOfRange` and a read-only region
/// fails with `ReadOnly` before anything is written.
pub fn replace_sequence<M: ProcessMemory + ?Sized>(
    memory: &M,
    region: &MemoryRegion,
    needle: &[u8],
    replacement: &[u8],
) -> Result<usize> {
    region.check_writable()?;

    let data = memory.read_region(region)?;
    let matches = find_sequence(&data, region.start, needle);
    debug!(
        "Found {} occurrence(s) of {} byte sequence in region {}",
        matches.len(),
        needle.len(),
        region.identity()
    );

    for &address in &matches {
        region.check_range(address, replacement.len())?;
    }
    for &address in &matches {
        memory.write_at(region, address, replacement)?;
    }

    info!(
        "Replaced {} occurrence(s) in region {}",
        matches.len(),
        region.identity()
    );
    Ok(matches.len())
}

/// Iterator over runs of printable ASCII, created by [`printable_strings`].
pub struct PrintableStrings<'a> {
    data: &'a [u8],
    pos: usize,
    min_len: usize,
}

/// Runs of at least `min_len` printable ASCII characters, with their
/// offsets into `data`. Tabs, newlines and carriage returns count as
/// printable.
pub fn printable_strings(data: &[u8], min_len: usize) -> PrintableStrings<'_> {
    PrintableStrings {
        data,
        pos: 0,
        min_len: min_len.max(1),
    }
}

fn is_printable(byte: u8) -> bool {
    byte.is_ascii_graphic() || matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

impl<'a> Iterator for PrintableStrings<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let start = self.pos;
            let len = self.data[start..]
                .iter()
                .take_while(|&&b| is_printable(b))
                .count();

            if len == 0 {
                self.pos += 1;
                continue;
            }

            self.pos = start + len;
            if len >= self.min_len {
                // Printable ASCII is always valid UTF-8
                let text = std::str::from_utf8(&self.data[start..start + len]).ok()?;
                return Some((start, text));
            }
        }
        None
    }
}
