//! Replace command implementation.

use anyhow::{Result, bail};
use memscan_core::replace_sequence;

use super::hex_utils::{format_hex_bytes, parse_hex_bytes, sequence_bytes};
use super::select::open_region;
use crate::{RegionSelector, SequenceArgs};

/// Run the replace command
pub fn run(
    pid: u32,
    selector: &RegionSelector,
    sequence: &SequenceArgs,
    with: Option<String>,
    with_hex: Option<String>,
) -> Result<()> {
    let needle = sequence_bytes(sequence)?;
    let replacement = replacement_bytes(with, with_hex)?;
    let (process, region) = open_region(pid, selector)?;

    let count = replace_sequence(&process, &region, &needle, &replacement)?;

    println!(
        "Replaced {} occurrence(s) of {} with {}",
        count,
        format_hex_bytes(&needle),
        format_hex_bytes(&replacement)
    );
    Ok(())
}

fn replacement_bytes(with: Option<String>, with_hex: Option<String>) -> Result<Vec<u8>> {
    match (with, with_hex) {
        (Some(text), _) if !text.is_empty() => Ok(text.into_bytes()),
        (Some(_), _) => bail!("Empty replacement"),
        (None, Some(hex)) => parse_hex_bytes(&hex),
        (None, None) => bail!("No replacement specified. Use --with or --with-hex"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_text() {
        assert_eq!(
            replacement_bytes(Some("ab".to_string()), None).unwrap(),
            b"ab".to_vec()
        );
    }

    #[test]
    fn test_replacement_empty_text_rejected() {
        assert!(replacement_bytes(Some(String::new()), None).is_err());
    }

    #[test]
    fn test_replacement_hex() {
        assert_eq!(
            replacement_bytes(None, Some("7B 00".to_string())).unwrap(),
            vec![0x7B, 0x00]
        );
    }

    #[test]
    fn test_replacement_missing() {
        assert!(replacement_bytes(None, None).is_err());
    }
}
