//! Short region identities for display and selection.
//!
//! The identity is a truncated SHA-256 of the region bounds. Truncation
//! admits collisions, so anything that must be exact compares full
//! `(start, end)` pairs instead.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Number of digest bytes kept
const IDENTITY_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapIdentity([u8; IDENTITY_LEN]);

impl MapIdentity {
    pub fn of(start: u64, end: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(start.to_le_bytes());
        hasher.update(end.to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[..IDENTITY_LEN]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }
}

impl fmt::Display for MapIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for MapIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != IDENTITY_LEN * 2 {
            return Err(format!(
                "identity must be {} hex characters, got {:?}",
                IDENTITY_LEN * 2,
                s
            ));
        }

        let mut bytes = [0u8; IDENTITY_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = s
                .get(i * 2..i * 2 + 2)
                .ok_or_else(|| format!("invalid identity: {:?}", s))?;
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|e| format!("invalid identity {:?}: {}", s, e))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for MapIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        assert_eq!(
            MapIdentity::of(0x5555_0000, 0x5557_1000),
            MapIdentity::of(0x5555_0000, 0x5557_1000)
        );
    }

    #[test]
    fn test_identity_depends_on_both_bounds() {
        let base = MapIdentity::of(0x1000, 0x2000);
        assert_ne!(base, MapIdentity::of(0x1000, 0x3000));
        assert_ne!(base, MapIdentity::of(0x0, 0x2000));
        // Swapping bounds is a different input
        assert_ne!(base, MapIdentity::of(0x2000, 0x1000));
    }

    #[test]
    fn test_identity_display_and_parse() {
        let id = MapIdentity::of(0x7fff_0000, 0x7fff_8000);
        let text = id.to_string();
        assert_eq!(text.len(), 8);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(text.parse::<MapIdentity>().unwrap(), id);
        assert_eq!(text.to_uppercase().parse::<MapIdentity>().unwrap(), id);
    }

    #[test]
    fn test_identity_parse_invalid() {
        assert!("abc".parse::<MapIdentity>().is_err());
        assert!("zzzzzzzz".parse::<MapIdentity>().is_err());
        assert!("0123456789".parse::<MapIdentity>().is_err());
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let id = MapIdentity::of(1, 2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
