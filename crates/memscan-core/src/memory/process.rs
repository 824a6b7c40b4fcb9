//! procfs-backed process access.
//!
//! Regions come from `/proc/<pid>/maps`, contents from `/proc/<pid>/mem`.
//! Reading another process requires ptrace access (same user with a
//! permissive `ptrace_scope`, or `CAP_SYS_PTRACE`).

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::maps::parse_maps;
use super::reader::ProcessMemory;
use super::region::MemoryRegion;
use crate::error::{Error, Result};

const PROC_ROOT: &str = "/proc";

#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub pid: u32,
    proc_dir: PathBuf,
}

impl ProcessHandle {
    /// Open a live process by PID
    pub fn open(pid: u32) -> Result<Self> {
        Self::with_proc_root(PROC_ROOT, pid)
    }

    /// Open a process below an alternative procfs root
    pub fn with_proc_root<P: AsRef<Path>>(root: P, pid: u32) -> Result<Self> {
        let proc_dir = root.as_ref().join(pid.to_string());
        if !proc_dir.is_dir() {
            return Err(Error::ProcessNotFound(pid));
        }
        debug!("Opened process {} at {}", pid, proc_dir.display());
        Ok(Self { pid, proc_dir })
    }

    /// Executable name from `comm`, if available
    pub fn name(&self) -> Option<String> {
        fs::read_to_string(self.proc_dir.join("comm"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn maps_path(&self) -> PathBuf {
        self.proc_dir.join("maps")
    }

    fn mem_path(&self) -> PathBuf {
        self.proc_dir.join("mem")
    }
}

impl ProcessMemory for ProcessHandle {
    fn list_regions(&self) -> Result<Vec<MemoryRegion>> {
        let text = fs::read_to_string(self.maps_path()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ProcessNotFound(self.pid)
            } else {
                Error::Io(e)
            }
        })?;
        parse_maps(&text)
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let read_failed = |e: std::io::Error| Error::ReadFailed {
            address,
            message: e.to_string(),
        };

        let mut file = File::open(self.mem_path()).map_err(read_failed)?;
        file.seek(SeekFrom::Start(address)).map_err(read_failed)?;

        let mut buffer = vec![0u8; size];
        file.read_exact(&mut buffer).map_err(read_failed)?;
        Ok(buffer)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        let write_failed = |e: std::io::Error| Error::WriteFailed {
            address,
            message: e.to_string(),
        };

        let mut file = OpenOptions::new()
            .write(true)
            .open(self.mem_path())
            .map_err(write_failed)?;
        file.seek(SeekFrom::Start(address)).map_err(write_failed)?;
        file.write_all(bytes).map_err(write_failed)?;
        debug!("Wrote {} bytes at 0x{:x}", bytes.len(), address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Permissions;
    use tempfile::TempDir;

    /// Build a fake procfs tree whose `mem` file is a flat image starting at
    /// address 0.
    fn fake_proc(pid: u32, maps: &str, mem: &[u8]) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("maps"), maps).unwrap();
        fs::write(dir.join("mem"), mem).unwrap();
        fs::write(dir.join("comm"), "target\n").unwrap();
        root
    }

    fn image() -> Vec<u8> {
        (0..0x300u32).map(|i| (i % 251) as u8).collect()
    }

    const MAPS: &str = "\
100-200 r--p 00000000 08:01 77 /usr/bin/target
200-300 rw-p 00000000 00:00 0 [heap]
";

    #[test]
    fn test_open_missing_process() {
        let root = tempfile::tempdir().unwrap();
        let err = ProcessHandle::with_proc_root(root.path(), 4242).unwrap_err();
        assert!(matches!(err, Error::ProcessNotFound(4242)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_regions_and_name() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        assert_eq!(process.name().as_deref(), Some("target"));

        let regions = process.list_regions().unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions[1].is_named("[heap]"));
        assert!(process.find_region(0x200, 0x300).unwrap().is_some());
        assert!(process.find_region(0x200, 0x280).unwrap().is_none());
    }

    #[test]
    fn test_read_region() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let heap = process.list_regions().unwrap().remove(1);

        let data = process.read_region(&heap).unwrap();
        assert_eq!(data.len(), 0x100);
        assert_eq!(data[..], image()[0x200..0x300]);
    }

    #[test]
    fn test_read_past_end_is_read_error() {
        let root = fake_proc(7, "200-400 rw-p 0 0 0\n", &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let region = process.list_regions().unwrap().remove(0);
        let err = process.read_region(&region).unwrap_err();
        assert!(matches!(err, Error::ReadFailed { address: 0x200, .. }));
        assert!(err.is_fatal_to_session());
    }

    #[test]
    fn test_read_range_out_of_region() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let heap = process.list_regions().unwrap().remove(1);
        assert_eq!(process.read_range(&heap, 0x210, 4).unwrap(), image()[0x210..0x214]);
        assert!(matches!(
            process.read_range(&heap, 0x2FE, 4),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_write_at() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let regions = process.list_regions().unwrap();

        process
            .write_at(&regions[1], 0x220, &[0xDE, 0xAD])
            .unwrap();
        assert_eq!(process.read_bytes(0x220, 2).unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_write_read_only_rejected_before_io() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let code = process.list_regions().unwrap().remove(0);
        assert!(!code.perms.write);

        let err = process.write_at(&code, 0x100, &[0]).unwrap_err();
        assert!(matches!(err, Error::ReadOnly { .. }));
        assert_eq!(process.read_bytes(0x100, 1).unwrap(), image()[0x100..0x101]);
    }

    #[test]
    fn test_write_out_of_range_rejected() {
        let root = fake_proc(7, MAPS, &image());
        let process = ProcessHandle::with_proc_root(root.path(), 7).unwrap();
        let region = MemoryRegion::new(0x200, 0x300, Permissions::read_write()).unwrap();
        assert!(matches!(
            process.write_at(&region, 0x2FF, &[1, 2]),
            Err(Error::OutOfRange { .. })
        ));
    }
}
