//! Parser for procfs `maps` files.
//!
//! Line format:
//!
//! ```text
//! 55d0c6a4e000-55d0c6a6f000 rw-p 00000000 00:00 0          [heap]
//! 7f1234567000-7f123456a000 r-xp 00000000 08:01 123456     /usr/lib/libc.so.6
//! ```

use std::str::FromStr;

use tracing::debug;

use super::region::{MemoryRegion, Permissions};
use crate::error::{Error, Result};

fn parse_error(line: &str, message: impl Into<String>) -> Error {
    Error::MapsParse {
        line: line.to_string(),
        message: message.into(),
    }
}

impl FromStr for MemoryRegion {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        // address perms offset dev inode [pathname]
        let mut parts = line.split_whitespace();
        let range = parts
            .next()
            .ok_or_else(|| parse_error(line, "missing address range"))?;
        let perms = parts
            .next()
            .ok_or_else(|| parse_error(line, "missing permissions"))?;
        let _offset = parts.next();
        let _dev = parts.next();
        let inode = parts.next();

        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| parse_error(line, "address range has no '-'"))?;
        let start = u64::from_str_radix(start, 16)
            .map_err(|e| parse_error(line, format!("invalid start address: {}", e)))?;
        let end = u64::from_str_radix(end, 16)
            .map_err(|e| parse_error(line, format!("invalid end address: {}", e)))?;
        let perms: Permissions = perms.parse().map_err(|e: String| parse_error(line, e))?;

        let mut region = MemoryRegion::new(start, end, perms)
            .map_err(|e| parse_error(line, e.to_string()))?;

        region.file_backed = match inode {
            Some(inode) => Some(
                inode
                    .parse::<u64>()
                    .map_err(|e| parse_error(line, format!("invalid inode: {}", e)))?
                    != 0,
            ),
            None => None,
        };

        // Pathnames may contain spaces ("/tmp/a b (deleted)")
        let name = parts.collect::<Vec<_>>().join(" ");
        if !name.is_empty() {
            region.name = Some(name);
        }

        Ok(region)
    }
}

/// Parse a whole maps file.
///
/// Regions must be reported in ascending, non-overlapping order.
pub fn parse_maps(text: &str) -> Result<Vec<MemoryRegion>> {
    let mut regions: Vec<MemoryRegion> = Vec::new();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let region: MemoryRegion = line.parse()?;
        if let Some(prev) = regions.last()
            && region.start < prev.end
        {
            return Err(parse_error(
                line,
                format!("overlaps previous region ending at 0x{:x}", prev.end),
            ));
        }
        regions.push(region);
    }

    debug!("Parsed {} regions", regions.len());
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
55d0c6800000-55d0c6802000 r--p 00000000 08:01 1835017                    /usr/bin/cat
55d0c6802000-55d0c6807000 r-xp 00002000 08:01 1835017                    /usr/bin/cat
55d0c6a4e000-55d0c6a6f000 rw-p 00000000 00:00 0                          [heap]
7f2b1c000000-7f2b1c021000 rw-p 00000000 00:00 0
7ffd3c5e1000-7ffd3c602000 rw-p 00000000 00:00 0                          [stack]
";

    #[test]
    fn test_parse_maps_sample() {
        let regions = parse_maps(SAMPLE).unwrap();
        assert_eq!(regions.len(), 5);

        let cat = &regions[0];
        assert_eq!(cat.start, 0x55d0c6800000);
        assert_eq!(cat.end, 0x55d0c6802000);
        assert_eq!(cat.name.as_deref(), Some("/usr/bin/cat"));
        assert_eq!(cat.file_backed, Some(true));
        assert!(cat.perms.read && !cat.perms.write);

        let heap = &regions[2];
        assert!(heap.is_named("[heap]"));
        assert_eq!(heap.file_backed, Some(false));
        assert!(heap.perms.write);
        assert_eq!(heap.size(), 0x21000);

        let anon = &regions[3];
        assert_eq!(anon.name, None);
    }

    #[test]
    fn test_parse_line_with_spaces_in_name() {
        let region: MemoryRegion = "7f0000000000-7f0000001000 rw-s 00000000 00:05 42 /tmp/a b (deleted)"
            .parse()
            .unwrap();
        assert_eq!(region.name.as_deref(), Some("/tmp/a b (deleted)"));
        assert!(region.perms.shared);
    }

    #[test]
    fn test_parse_line_minimal() {
        let region: MemoryRegion = "1000-2000 r--p".parse().unwrap();
        assert_eq!(region.file_backed, None);
        assert_eq!(region.name, None);
    }

    #[test]
    fn test_parse_invalid_lines() {
        for line in [
            "",
            "1000",
            "zzzz-2000 rw-p 0 0 0",
            "1000-2000",
            "1000-2000 rwzp 0 0 0",
            "2000-1000 rw-p 0 0 0",
            "1000-2000 rw-p 0 0 notanumber",
        ] {
            assert!(
                matches!(line.parse::<MemoryRegion>(), Err(Error::MapsParse { .. })),
                "line {:?} should fail",
                line
            );
        }
    }

    #[test]
    fn test_parse_maps_rejects_overlap() {
        let text = "1000-3000 rw-p 0 0 0\n2000-4000 rw-p 0 0 0\n";
        assert!(matches!(parse_maps(text), Err(Error::MapsParse { .. })));
    }
}
