//! Live Process Memory Source
//!
//! Memory source implementation for reading from a running process.

use super::{MemorySource, ReadError};

#[cfg(not(target_os = "linux"))]
use process_memory::CopyAddress;
use process_memory::{ProcessHandle, TryIntoProcessHandle};
use std::io;
use sysinfo::System;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("no running process matches {name:?}")]
    NotFound { name: String },

    #[error("failed to attach to process {pid}. Try running with sudo")]
    Attach {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}

/// An attached process whose memory can be read
pub struct ProcessMemory {
    pub pid: u32,
    pub handle: ProcessHandle,
}

// On Linux and macOS the handle is plain data (pid and arch, or a mach port
// name) and already `Send + Sync`. Only the Windows raw HANDLE needs this.
// SAFETY: a Windows process HANDLE is valid process-wide from any thread, and
// `ReadProcessMemory` through a shared handle does not mutate it.
#[cfg(windows)]
unsafe impl Send for ProcessMemory {}
#[cfg(windows)]
unsafe impl Sync for ProcessMemory {}

impl ProcessMemory {
    /// Attach to a running process by PID
    pub fn attach(pid: u32) -> Result<Self, ProcessError> {
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|source| ProcessError::Attach { pid, source })?;

        tracing::debug!(pid, "attached to process");
        Ok(ProcessMemory { pid, handle })
    }

    /// Copy from `address` into `buffer`, returning how many bytes arrived
    ///
    /// `process_vm_readv` stops at the first inaccessible page and reports a
    /// partial count instead of failing, so the count has to be checked.
    #[cfg(target_os = "linux")]
    fn read_into(&self, address: usize, buffer: &mut [u8]) -> io::Result<usize> {
        let local = libc::iovec {
            iov_base: buffer.as_mut_ptr().cast(),
            iov_len: buffer.len(),
        };
        let remote = libc::iovec {
            iov_base: address as *mut libc::c_void,
            iov_len: buffer.len(),
        };

        // SAFETY: `local` covers exactly `buffer`, which is writable for its
        // whole length. `remote` is only dereferenced by the kernel inside the
        // target's address space.
        let read = unsafe {
            libc::process_vm_readv(self.pid as libc::pid_t, &local, 1, &remote, 1, 0)
        };

        if read < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(read as usize)
    }

    /// `ReadProcessMemory` and `mach_vm_read` fail outright on partial copies
    #[cfg(not(target_os = "linux"))]
    fn read_into(&self, address: usize, buffer: &mut [u8]) -> io::Result<usize> {
        self.handle.copy_address(address, buffer)?;
        Ok(buffer.len())
    }
}

impl MemorySource for ProcessMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadError> {
        let addr = usize::try_from(address).map_err(|_| ReadError::AddressOverflow { address })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| ReadError::OutOfMemory { size })?;
        buffer.resize(size, 0);

        let read = self
            .read_into(addr, &mut buffer)
            .map_err(|source| ReadError::Io {
                address,
                size,
                source,
            })?;

        if read != size {
            return Err(ReadError::Short {
                address,
                expected: size,
                actual: read,
            });
        }
        Ok(buffer)
    }

    fn is_live(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("process {}", self.pid)
    }
}

/// Find a running process by executable name or command line
///
/// When several processes match, the one with the largest resident memory
/// wins. Threads are folded into their thread group.
pub fn find_process(name: &str) -> Result<u32, ProcessError> {
    let mut system = System::new_all();
    system.refresh_all();

    let needle = name.to_lowercase();
    let mut candidates: Vec<(u32, u64)> = Vec::new();

    for process in system.processes().values() {
        let pid = process.pid().as_u32();

        let name_matches = process
            .name()
            .to_string_lossy()
            .to_lowercase()
            .contains(&needle);
        let cmd_matches = process
            .cmd()
            .iter()
            .any(|arg| arg.to_string_lossy().to_lowercase().contains(&needle));

        if name_matches || cmd_matches {
            let tgid = get_tgid(pid).unwrap_or(pid);
            candidates.push((tgid, process.memory()));
        }
    }

    pick_candidate(candidates).ok_or_else(|| ProcessError::NotFound {
        name: name.to_string(),
    })
}

/// Pick the `(pid, memory)` candidate with the most memory
fn pick_candidate(candidates: Vec<(u32, u64)>) -> Option<u32> {
    let (pid, memory) = candidates.into_iter().max_by_key(|&(_, memory)| memory)?;
    tracing::info!(pid, memory_mb = memory / 1_000_000, "found process");
    Some(pid)
}

/// Get the thread group ID (main process) for a given PID/TID
pub fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    parse_tgid(&status)
}

fn parse_tgid(status: &str) -> Option<u32> {
    status
        .lines()
        .find(|line| line.starts_with("Tgid:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|tgid| tgid.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tgid() {
        let status = "Name:\tgame.exe\nUmask:\t0022\nState:\tS (sleeping)\nTgid:\t4242\nNgid:\t0\nPid:\t4250\n";
        assert_eq!(parse_tgid(status), Some(4242));
    }

    #[test]
    fn test_parse_tgid_missing() {
        assert_eq!(parse_tgid("Name:\tgame.exe\nPid:\t1\n"), None);
        assert_eq!(parse_tgid("Tgid:\tabc\n"), None);
    }

    #[test]
    fn test_pick_candidate_prefers_largest() {
        let pid = pick_candidate(vec![(10, 100), (20, 5_000_000_000), (30, 42)]);
        assert_eq!(pid, Some(20));
    }

    #[test]
    fn test_pick_candidate_empty() {
        assert_eq!(pick_candidate(Vec::new()), None);
    }

    #[test]
    fn test_find_process_not_found() {
        let result = find_process("memdump-no-such-process-5f3a9c");
        assert!(matches!(result, Err(ProcessError::NotFound { .. })));
    }

    #[test]
    fn test_read_huge_size_is_out_of_memory() {
        let process = ProcessMemory::attach(std::process::id()).unwrap();

        for size in [usize::MAX, isize::MAX as usize] {
            let result = process.read_bytes(0x1000, size);
            assert!(matches!(result, Err(ReadError::OutOfMemory { size: s }) if s == size));
        }
    }

    #[cfg(target_os = "linux")]
    mod linux {
        use super::*;
        use crate::{dump, DumpError};

        /// Two anonymous pages; the second is `PROT_NONE`
        struct GuardedPage {
            base: *mut u8,
            page: usize,
        }

        impl GuardedPage {
            fn new() -> Self {
                // SAFETY: sysconf has no preconditions.
                let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;

                // SAFETY: anonymous private mapping with no address hint; the
                // result is checked against MAP_FAILED before use.
                let base = unsafe {
                    libc::mmap(
                        std::ptr::null_mut(),
                        page * 2,
                        libc::PROT_READ | libc::PROT_WRITE,
                        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                        -1,
                        0,
                    )
                };
                assert_ne!(base, libc::MAP_FAILED);

                // SAFETY: the second page lies inside the mapping created above.
                let protected = unsafe {
                    libc::mprotect(base.cast::<u8>().add(page).cast(), page, libc::PROT_NONE)
                };
                assert_eq!(protected, 0);

                // SAFETY: the first page is mapped read/write and `page` bytes long.
                let first = unsafe { std::slice::from_raw_parts_mut(base.cast::<u8>(), page) };
                for (i, byte) in first.iter_mut().enumerate() {
                    *byte = i as u8;
                }

                GuardedPage {
                    base: base.cast(),
                    page,
                }
            }

            /// Address `offset` bytes before the end of the readable page
            fn tail(&self, offset: usize) -> u64 {
                self.base as u64 + (self.page - offset) as u64
            }

            fn guard(&self) -> u64 {
                self.base as u64 + self.page as u64
            }
        }

        impl Drop for GuardedPage {
            fn drop(&mut self) {
                // SAFETY: unmaps exactly the region mapped in `new`.
                unsafe { libc::munmap(self.base.cast(), self.page * 2) };
            }
        }

        /// Attach to ourselves, or `None` when `process_vm_readv` is blocked
        fn attach_self(probe: &[u8]) -> Option<ProcessMemory> {
            let process = ProcessMemory::attach(std::process::id()).unwrap();
            match process.read_bytes(probe.as_ptr() as u64, probe.len()) {
                Ok(bytes) => {
                    assert_eq!(bytes, probe);
                    Some(process)
                }
                Err(ReadError::Io { ref source, .. })
                    if matches!(source.raw_os_error(), Some(libc::EPERM) | Some(libc::ENOSYS)) =>
                {
                    eprintln!("skipping: process_vm_readv unavailable: {}", source);
                    None
                }
                Err(err) => panic!("self read failed: {}", err),
            }
        }

        #[test]
        fn test_read_own_memory() {
            let data: Vec<u8> = (0u8..32).collect();
            let Some(process) = attach_self(&data) else {
                return;
            };
            assert!(process.is_live());
        }

        #[test]
        fn test_read_across_mapping_end_is_short() {
            let pages = GuardedPage::new();
            let Some(process) = attach_self(&[1, 2, 3]) else {
                return;
            };

            let result = process.read_bytes(pages.tail(16), 32);

            assert!(matches!(
                result,
                Err(ReadError::Short {
                    expected: 32,
                    actual: 16,
                    ..
                })
            ));
        }

        #[test]
        fn test_read_unmapped_is_io_error() {
            let pages = GuardedPage::new();
            let Some(process) = attach_self(&[1, 2, 3]) else {
                return;
            };

            let result = process.read_bytes(pages.guard(), 16);

            match result {
                Err(ReadError::Io { source, .. }) => {
                    assert_eq!(source.raw_os_error(), Some(libc::EFAULT));
                }
                other => panic!("expected EFAULT, got {:?}", other.map(|b| b.len())),
            }
        }

        #[test]
        fn test_dump_across_mapping_end_writes_nothing() {
            let pages = GuardedPage::new();
            let Some(process) = attach_self(&[1, 2, 3]) else {
                return;
            };
            let temp_dir = tempfile::tempdir().unwrap();
            let output = temp_dir.path().join("dump.bin");

            let start = pages.tail(16);
            let err = dump(&process, start, start + 32, &output).unwrap_err();

            assert!(matches!(
                err,
                DumpError::MemoryReadFailure {
                    source: ReadError::Short { actual: 16, .. },
                    ..
                }
            ));
            assert!(!output.exists());
        }

        #[test]
        fn test_dump_readable_tail_matches_memory() {
            let pages = GuardedPage::new();
            let Some(process) = attach_self(&[1, 2, 3]) else {
                return;
            };
            let temp_dir = tempfile::tempdir().unwrap();
            let output = temp_dir.path().join("dump.bin");

            let start = pages.tail(16);
            dump(&process, start, start + 16, &output).unwrap();

            let expected: Vec<u8> = (pages.page - 16..pages.page).map(|i| i as u8).collect();
            assert_eq!(std::fs::read(&output).unwrap(), expected);
        }
    }
}
