//! Memory Source Abstraction
//!
//! Abstractions for reading raw bytes from a process address space:
//! - Live process attachment via `ProcessMemory`
//! - Mock sources for testing

#[cfg(any(test, feature = "mock"))]
mod mock;
mod process;
mod traits;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockMemorySource;
pub use process::{find_process, get_tgid, ProcessError, ProcessMemory};
pub use traits::{MemorySource, ReadError};
