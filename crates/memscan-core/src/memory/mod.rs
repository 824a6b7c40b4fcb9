//! Process memory access.
//!
//! - [`MemoryRegion`]: one mapped range with permissions and identity
//! - [`ProcessMemory`]: enumerate, read and write a process's regions
//! - [`ProcessHandle`]: procfs implementation
//! - [`find_sequence`] / [`replace_sequence`] / [`printable_strings`]:
//!   whole-region helpers built on top

mod identity;
mod maps;
mod process;
mod reader;
mod region;
mod search;

// Mock process for unit and integration tests
#[doc(hidden)]
pub mod mock;

pub use identity::MapIdentity;
pub use maps::parse_maps;
pub use process::ProcessHandle;
pub use reader::ProcessMemory;
pub use region::{MemoryRegion, Permissions};
pub use search::{PrintableStrings, find_sequence, printable_strings, replace_sequence};

#[doc(hidden)]
pub use mock::{MockProcess, MockProcessBuilder};
