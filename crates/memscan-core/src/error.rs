use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("Invalid region bounds 0x{start:x}-0x{end:x}")]
    InvalidRegion { start: u64, end: u64 },

    #[error("Range 0x{address:x}+{len} is outside region 0x{start:x}-0x{end:x}")]
    OutOfRange {
        address: u64,
        len: usize,
        start: u64,
        end: u64,
    },

    #[error("Region 0x{start:x}-0x{end:x} is not writable")]
    ReadOnly { start: u64, end: u64 },

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    ReadFailed { address: u64, message: String },

    #[error("Failed to write process memory at address {address:#x}: {message}")]
    WriteFailed { address: u64, message: String },

    #[error("Region 0x{start:x}-0x{end:x} changed shape: {reason}")]
    RegionChanged { start: u64, end: u64, reason: String },

    #[error("Buffer length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Scan session already finished ({0})")]
    SessionFinished(String),

    #[error("Invalid maps line {line:?}: {message}")]
    MapsParse { line: String, message: String },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ProcessNotFound(_))
            || matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Errors after which a scanning session cannot continue and must be
    /// re-seeded against a freshly enumerated region.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Error::ReadFailed { .. } | Error::WriteFailed { .. } | Error::RegionChanged { .. }
        )
    }
}
