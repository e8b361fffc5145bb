//! # memdump
//!
//! Dump a contiguous range of process memory to a raw file.
//!
//! This library provides:
//! - A validated half-open [`AddressRange`]
//! - The [`MemorySource`] abstraction over anything that can read bytes at an
//!   address (a live process, or a mock in tests)
//! - The [`dump`] operation: one read, one write, nothing else
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pid = memdump::find_process("game.exe")?;
//! let process = memdump::ProcessMemory::attach(pid)?;
//!
//! memdump::dump(&process, 0x0EB4_3A80, 0x0F27_4BE8, Path::new("dump.bin"))?;
//! # Ok(())
//! # }
//! ```

pub mod dump;
pub mod error;
pub mod range;
pub mod source;

pub use dump::{dump, dump_range};
pub use error::DumpError;
pub use range::{parse_address, AddressRange, RangeError};
#[cfg(any(test, feature = "mock"))]
pub use source::MockMemorySource;
pub use source::{find_process, MemorySource, ProcessError, ProcessMemory, ReadError};
