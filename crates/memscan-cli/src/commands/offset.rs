//! Offset command implementation.

use anyhow::Result;

use super::hex_utils::{format_hex_address, parse_hex_address};

/// Run the offset command
pub fn run(from: &str, to: &str) -> Result<()> {
    let from_addr = parse_hex_address(from)?;
    let to_addr = parse_hex_address(to)?;

    println!("From: {}", format_hex_address(from_addr));
    println!("To:   {}", format_hex_address(to_addr));
    println!();
    println!("Offset: {}", format_offset(from_addr, to_addr));

    Ok(())
}

/// Signed distance from `from` to `to`, in decimal and hex.
fn format_offset(from: u64, to: u64) -> String {
    let (sign, diff) = if to >= from {
        ("", to - from)
    } else {
        ("-", from - to)
    };
    format!("{}{} ({}0x{:X})", sign, diff, sign, diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_offset_forward() {
        assert_eq!(format_offset(0x1000, 0x1010), "16 (0x10)");
    }

    #[test]
    fn test_format_offset_backward() {
        assert_eq!(format_offset(0x1010, 0x1000), "-16 (-0x10)");
    }

    #[test]
    fn test_format_offset_zero() {
        assert_eq!(format_offset(0x1000, 0x1000), "0 (0x0)");
    }
}
