//! Hexdump command implementation.
//!
//! Displays raw memory bytes in traditional hexdump format. The requested
//! range must lie inside a single region; it is never clamped.
//!
//! # Output Format
//!
//! ```text
//! 0x000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use anyhow::{Result, bail};
use memscan_core::{ProcessHandle, ProcessMemory};

use super::hex_utils::parse_hex_address;

/// Run the hexdump command
pub fn run(pid: u32, address: &str, size: usize, ascii: bool) -> Result<()> {
    let address = parse_hex_address(address)?;
    let process = ProcessHandle::open(pid)?;

    let regions = process.list_regions()?;
    let Some(region) = regions.iter().find(|r| r.contains(address)) else {
        bail!("Address 0x{:X} is not mapped", address);
    };

    let bytes = process.read_range(region, address, size)?;

    println!("Hexdump at 0x{:X} ({} bytes):", address, size);
    println!();

    for line in format_lines(&bytes, ascii) {
        println!("{}", line);
    }

    Ok(())
}

fn format_lines(bytes: &[u8], ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| format_line(i * 16, chunk, ascii))
        .collect()
}

fn format_line(offset: usize, chunk: &[u8], ascii: bool) -> String {
    let mut line = format!("0x{:03X}: ", offset);

    // Hex bytes
    for (j, byte) in chunk.iter().enumerate() {
        if j == 8 {
            line.push(' ');
        }
        line.push_str(&format!("{:02X} ", byte));
    }

    // Padding for incomplete lines
    for j in chunk.len()..16 {
        if j == 8 {
            line.push(' ');
        }
        line.push_str("   ");
    }

    // ASCII representation
    if ascii {
        line.push_str(" |");
        for byte in chunk {
            if (0x20..0x7F).contains(byte) {
                line.push(*byte as char);
            } else {
                line.push('.');
            }
        }
        for _ in chunk.len()..16 {
            line.push(' ');
        }
        line.push('|');
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_full_line() {
        let line = format_line(0, b"Hello World\0\0\0\0\0", true);
        assert_eq!(
            line,
            "0x000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|"
        );
    }

    #[test]
    fn test_format_partial_line_is_padded() {
        let full = format_line(0, &[0u8; 16], false);
        let partial = format_line(16, &[0xAB, 0xCD], false);
        assert_eq!(full.len(), partial.len());
        assert!(partial.starts_with("0x010: AB CD "));
    }

    #[test]
    fn test_format_lines_count() {
        assert_eq!(format_lines(&[0u8; 33], false).len(), 3);
        assert!(format_lines(&[], false).is_empty());
    }
}
