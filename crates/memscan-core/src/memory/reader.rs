use crate::error::{Error, Result};

use super::region::MemoryRegion;

/// Access to a traced process's address space.
///
/// Implementors only provide the raw primitives; the region-aware
/// operations validate bounds and permissions before reaching the OS.
pub trait ProcessMemory {
    /// Enumerate the process's regions, freshly, in ascending order.
    fn list_regions(&self) -> Result<Vec<MemoryRegion>>;

    /// Read `size` bytes at an absolute address.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Write `bytes` at an absolute address.
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()>;

    /// Read the whole region. Anything short of `region.size()` bytes is a
    /// read failure.
    fn read_region(&self, region: &MemoryRegion) -> Result<Vec<u8>> {
        let data = self.read_bytes(region.start, region.size())?;
        if data.len() != region.size() {
            return Err(Error::ReadFailed {
                address: region.start,
                message: format!("short read: {} of {} bytes", data.len(), region.size()),
            });
        }
        Ok(data)
    }

    fn read_range(&self, region: &MemoryRegion, address: u64, len: usize) -> Result<Vec<u8>> {
        region.check_range(address, len)?;
        self.read_bytes(address, len)
    }

    /// Write inside `region`. Read-only regions are rejected before any
    /// write is attempted.
    fn write_at(&self, region: &MemoryRegion, address: u64, bytes: &[u8]) -> Result<()> {
        region.check_writable()?;
        region.check_range(address, bytes.len())?;
        self.write_bytes(address, bytes)
    }

    /// Re-enumerate and return the region with exactly these bounds.
    fn find_region(&self, start: u64, end: u64) -> Result<Option<MemoryRegion>> {
        Ok(self
            .list_regions()?
            .into_iter()
            .find(|r| r.start == start && r.end == end))
    }
}

impl<T: ProcessMemory + ?Sized> ProcessMemory for &T {
    fn list_regions(&self) -> Result<Vec<MemoryRegion>> {
        (**self).list_regions()
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }
}
