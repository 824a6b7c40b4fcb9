//! Hex address and byte-sequence parsing and formatting utilities.

use anyhow::{Result, bail};

use crate::SequenceArgs;

/// Parse a hex address string (with or without 0x prefix).
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(s, 16).map_err(|e| anyhow::anyhow!("Invalid hex address: {}", e))
}

/// Format an address as a hex string with 0x prefix.
pub fn format_hex_address(addr: u64) -> String {
    format!("0x{:X}", addr)
}

/// Parse space-separated hex bytes (e.g. "DE AD BE EF").
///
/// A run without spaces ("DEADBEEF") is accepted too.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for part in s.split_whitespace() {
        let part = part.trim_start_matches("0x").trim_start_matches("0X");
        if part.len() % 2 != 0 {
            bail!("Invalid hex byte sequence: {:?} has an odd length", part);
        }
        for i in (0..part.len()).step_by(2) {
            let pair = part
                .get(i..i + 2)
                .ok_or_else(|| anyhow::anyhow!("Invalid hex byte: {}", part))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| anyhow::anyhow!("Invalid hex byte: {}", pair))?;
            bytes.push(byte);
        }
    }
    if bytes.is_empty() {
        bail!("Empty byte sequence");
    }
    Ok(bytes)
}

/// Resolve `--string` / `--hex` into raw bytes.
pub fn sequence_bytes(sequence: &SequenceArgs) -> Result<Vec<u8>> {
    match (&sequence.string, &sequence.hex) {
        (Some(s), _) if !s.is_empty() => Ok(s.as_bytes().to_vec()),
        (Some(_), _) => bail!("Empty search string"),
        (None, Some(hex)) => parse_hex_bytes(hex),
        (None, None) => bail!("No sequence specified. Use --string or --hex"),
    }
}

/// Render bytes as space-separated uppercase hex.
pub fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_address_with_prefix() {
        assert_eq!(parse_hex_address("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_address("0X1000").unwrap(), 0x1000);
    }

    #[test]
    fn test_parse_hex_address_without_prefix() {
        assert_eq!(parse_hex_address("1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_address("7ffd3c5e1000").unwrap(), 0x7ffd3c5e1000);
    }

    #[test]
    fn test_parse_hex_address_invalid() {
        assert!(parse_hex_address("GHIJK").is_err());
        assert!(parse_hex_address("0xZZZ").is_err());
    }

    #[test]
    fn test_format_hex_address() {
        assert_eq!(format_hex_address(0x1000), "0x1000");
        assert_eq!(format_hex_address(0xDEADBEEF), "0xDEADBEEF");
        assert_eq!(format_hex_address(0), "0x0");
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("DE AD be ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex_bytes("DEADBEEF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex_bytes("0x7B").unwrap(), vec![0x7B]);
    }

    #[test]
    fn test_parse_hex_bytes_invalid() {
        assert!(parse_hex_bytes("").is_err());
        assert!(parse_hex_bytes("ABC").is_err());
        assert!(parse_hex_bytes("GG").is_err());
    }

    #[test]
    fn test_sequence_bytes() {
        let text = SequenceArgs {
            string: Some("{".to_string()),
            hex: None,
        };
        assert_eq!(sequence_bytes(&text).unwrap(), b"{".to_vec());

        let hex = SequenceArgs {
            string: None,
            hex: Some("00 FF".to_string()),
        };
        assert_eq!(sequence_bytes(&hex).unwrap(), vec![0x00, 0xFF]);

        let empty = SequenceArgs {
            string: Some(String::new()),
            hex: None,
        };
        assert!(sequence_bytes(&empty).is_err());
    }

    #[test]
    fn test_format_hex_bytes() {
        assert_eq!(format_hex_bytes(&[0x0A, 0xFF]), "0A FF");
        assert_eq!(format_hex_bytes(&[]), "");
    }
}
