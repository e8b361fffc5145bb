//! Error types for the dump operation.

use std::path::PathBuf;

use thiserror::Error;

use crate::range::RangeError;
use crate::source::ReadError;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("invalid address range")]
    InvalidRange(#[from] RangeError),

    #[error("failed to read {size:#x} bytes at {address:#x}")]
    MemoryReadFailure {
        address: u64,
        size: usize,
        #[source]
        source: ReadError,
    },

    #[error("failed to write dump to {}", path.display())]
    FileWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DumpError {
    /// Short, stable name for the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            DumpError::InvalidRange(_) => "InvalidRange",
            DumpError::MemoryReadFailure { .. } => "MemoryReadFailure",
            DumpError::FileWriteFailure { .. } => "FileWriteFailure",
        }
    }
}
