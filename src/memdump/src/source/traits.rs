//! Memory Source Trait
//!
//! Core abstraction for reading memory from various sources.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{size:#x} bytes at {address:#x} are not mapped")]
    Unmapped { address: u64, size: usize },

    #[error("short read at {address:#x}: got {actual:#x} of {expected:#x} bytes")]
    Short {
        address: u64,
        expected: usize,
        actual: usize,
    },

    #[error("address {address:#x} is not addressable on this platform")]
    AddressOverflow { address: u64 },

    #[error("cannot allocate a {size:#x} byte buffer")]
    OutOfMemory { size: usize },

    #[error("I/O error reading {size:#x} bytes at {address:#x}")]
    Io {
        address: u64,
        size: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for reading memory from various sources (live process, mock, etc.)
pub trait MemorySource: Send + Sync {
    /// Read exactly `size` bytes starting at a virtual address
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadError>;

    /// Check if this is a live process
    fn is_live(&self) -> bool;

    /// Short label for log output
    fn describe(&self) -> String;
}
