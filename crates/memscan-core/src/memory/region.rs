//! Memory region model.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::identity::MapIdentity;
use crate::error::{Error, Result};

/// Access permissions of a region as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    /// Shared mapping (`s`) rather than private copy-on-write (`p`)
    pub shared: bool,
}

impl Permissions {
    pub const fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            execute: false,
            shared: false,
        }
    }

    pub const fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            execute: false,
            shared: false,
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

impl FromStr for Permissions {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let flags: Vec<char> = s.chars().collect();
        if flags.len() < 3 || flags.len() > 4 {
            return Err(format!("invalid permission string {:?}", s));
        }

        let flag = |i: usize, set: char| match flags[i] {
            c if c == set => Ok(true),
            '-' => Ok(false),
            c => Err(format!("unexpected permission flag {:?} in {:?}", c, s)),
        };

        Ok(Self {
            read: flag(0, 'r')?,
            write: flag(1, 'w')?,
            execute: flag(2, 'x')?,
            shared: flags.get(3) == Some(&'s'),
        })
    }
}

/// One contiguous region of a process's address space.
///
/// Regions are re-enumerated whenever they are needed; nothing holds on to
/// one across scanning rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub perms: Permissions,
    /// Backing file path or pseudo-name such as `[heap]`
    pub name: Option<String>,
    /// Whether the mapping is backed by a file, when known
    pub file_backed: Option<bool>,
}

impl MemoryRegion {
    pub fn new(start: u64, end: u64, perms: Permissions) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidRegion { start, end });
        }
        Ok(Self {
            start,
            end,
            perms,
            name: None,
            file_backed: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn size(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn identity(&self) -> MapIdentity {
        MapIdentity::of(self.start, self.end)
    }

    /// Same bounds as `other`; identities alone are not enough for this.
    pub fn same_bounds(&self, other: &MemoryRegion) -> bool {
        self.start == other.start && self.end == other.end
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }

    pub fn contains_range(&self, address: u64, len: usize) -> bool {
        self.contains(address)
            && address
                .checked_add(len as u64)
                .is_some_and(|range_end| range_end <= self.end)
    }

    /// Validate a sub-range before touching memory. Never clamps.
    pub fn check_range(&self, address: u64, len: usize) -> Result<()> {
        if self.contains_range(address, len) {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                address,
                len,
                start: self.start,
                end: self.end,
            })
        }
    }

    pub fn check_writable(&self) -> Result<()> {
        if self.perms.write {
            Ok(())
        } else {
            Err(Error::ReadOnly {
                start: self.start,
                end: self.end,
            })
        }
    }

    /// Offset of an absolute address relative to the region start
    pub fn offset_of(&self, address: u64) -> Option<usize> {
        self.contains(address)
            .then(|| (address - self.start) as usize)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:012x}-{:012x} {} {:>10}",
            self.identity(),
            self.start,
            self.end,
            self.perms,
            self.size()
        )?;
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}
