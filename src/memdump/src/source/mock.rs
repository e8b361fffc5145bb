//! Mock Memory Source
//!
//! A mock memory source for testing dumps without a live process.

use super::{MemorySource, ReadError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mock memory source backed by a contiguous buffer
pub struct MockMemorySource {
    /// Raw memory data (contiguous, starting at base_address)
    pub data: Vec<u8>,
    /// Base virtual address for the data
    pub base_address: u64,
    /// Bytes dropped from the tail of every read, to simulate short reads
    pub short_by: usize,
    reads: AtomicUsize,
}

impl MockMemorySource {
    /// Create a new mock with data at given base address
    pub fn new(data: Vec<u8>, base_address: u64) -> Self {
        Self {
            data,
            base_address,
            short_by: 0,
            reads: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose reads come back `short_by` bytes shorter than asked
    pub fn with_short_reads(data: Vec<u8>, base_address: u64, short_by: usize) -> Self {
        Self {
            short_by,
            ..Self::new(data, base_address)
        }
    }

    /// Number of `read_bytes` calls made so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let unmapped = ReadError::Unmapped { address, size };
        if address < self.base_address {
            return Err(unmapped);
        }

        let offset = usize::try_from(address - self.base_address)
            .map_err(|_| ReadError::AddressOverflow { address })?;
        let end = match offset.checked_add(size) {
            Some(end) if end <= self.data.len() => end,
            _ => return Err(unmapped),
        };

        let end = end.saturating_sub(self.short_by).max(offset);
        Ok(self.data[offset..end].to_vec())
    }

    fn is_live(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!(
            "mock memory at {:#x} ({} bytes)",
            self.base_address,
            self.data.len()
        )
    }
}
