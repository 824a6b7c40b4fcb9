//! In-memory process for tests.
//!
//! Region contents can be mutated between scanning rounds through a shared
//! reference, mirroring a live process that keeps running while a session
//! holds on to it.

use std::cell::{Cell, RefCell};

use super::reader::ProcessMemory;
use super::region::{MemoryRegion, Permissions};
use crate::error::{Error, Result};

struct MockRegion {
    region: MemoryRegion,
    data: Vec<u8>,
}

pub struct MockProcess {
    regions: RefCell<Vec<MockRegion>>,
    fail_reads: Cell<bool>,
    writes: Cell<usize>,
}

impl MockProcess {
    pub fn builder() -> MockProcessBuilder {
        MockProcessBuilder::default()
    }

    /// Overwrite bytes at an absolute address, ignoring permissions.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside a single mock region.
    pub fn poke(&self, address: u64, bytes: &[u8]) {
        let mut regions = self.regions.borrow_mut();
        let entry = regions
            .iter_mut()
            .find(|r| r.region.contains_range(address, bytes.len()))
            .expect("poke outside mock regions");
        let offset = (address - entry.region.start) as usize;
        entry.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Replace the whole content of the region starting at `start`.
    pub fn fill(&self, start: u64, data: &[u8]) {
        self.poke(start, data);
    }

    /// Replace the region table, as if the OS remapped memory.
    pub fn remap(&self, start: u64, end: u64, perms: Permissions) {
        let mut regions = self.regions.borrow_mut();
        regions.retain(|r| r.region.end <= start || r.region.start >= end);
        regions.push(MockRegion {
            region: MemoryRegion::new(start, end, perms).expect("valid mock region"),
            data: vec![0; (end - start) as usize],
        });
        regions.sort_by_key(|r| r.region.start);
    }

    /// Drop the region starting at `start` from the table.
    pub fn unmap(&self, start: u64) {
        self.regions.borrow_mut().retain(|r| r.region.start != start);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Number of raw writes that reached the mock
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ProcessMemory for MockProcess {
    fn list_regions(&self) -> Result<Vec<MemoryRegion>> {
        Ok(self
            .regions
            .borrow()
            .iter()
            .map(|r| r.region.clone())
            .collect())
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if self.fail_reads.get() {
            return Err(Error::ReadFailed {
                address,
                message: "mock read failure".to_string(),
            });
        }

        let regions = self.regions.borrow();
        let entry = regions
            .iter()
            .find(|r| r.region.contains_range(address, size))
            .ok_or_else(|| Error::ReadFailed {
                address,
                message: "unmapped".to_string(),
            })?;
        let offset = (address - entry.region.start) as usize;
        Ok(entry.data[offset..offset + size].to_vec())
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        let mut regions = self.regions.borrow_mut();
        let entry = regions
            .iter_mut()
            .find(|r| r.region.contains_range(address, bytes.len()))
            .ok_or_else(|| Error::WriteFailed {
                address,
                message: "unmapped".to_string(),
            })?;
        let offset = (address - entry.region.start) as usize;
        entry.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockProcessBuilder {
    regions: Vec<MockRegion>,
}

impl MockProcessBuilder {
    /// Add a region starting at `start` holding `data`.
    pub fn region(mut self, start: u64, perms: Permissions, data: &[u8]) -> Self {
        let region = MemoryRegion::new(start, start + data.len() as u64, perms)
            .expect("mock region must not be empty");
        self.regions.push(MockRegion {
            region,
            data: data.to_vec(),
        });
        self
    }

    /// Name the most recently added region.
    pub fn named(mut self, name: &str) -> Self {
        if let Some(last) = self.regions.last_mut() {
            last.region.name = Some(name.to_string());
        }
        self
    }

    pub fn build(mut self) -> MockProcess {
        self.regions.sort_by_key(|r| r.region.start);
        MockProcess {
            regions: RefCell::new(self.regions),
            fail_reads: Cell::new(false),
            writes: Cell::new(0),
        }
    }
}
