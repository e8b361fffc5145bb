//! Memory range dumping.
//!
//! Reads one address range from a [`MemorySource`] and writes the bytes
//! verbatim to a file. The sequence is strictly: validate, read once, write
//! once. Nothing is written unless the full range was read.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::DumpError;
use crate::range::AddressRange;
use crate::source::{MemorySource, ReadError};

/// Dump `[start, end)` from `source` into `output`
///
/// The output file is created or truncated. Fails with
/// [`DumpError::InvalidRange`] before any I/O when `end <= start`.
pub fn dump(
    source: &dyn MemorySource,
    start: u64,
    end: u64,
    output: &Path,
) -> Result<(), DumpError> {
    let range = AddressRange::new(start, end)?;
    dump_range(source, &range, output)
}

/// Dump a pre-validated range from `source` into `output`
pub fn dump_range(
    source: &dyn MemorySource,
    range: &AddressRange,
    output: &Path,
) -> Result<(), DumpError> {
    let data = read_range(source, range)?;

    tracing::debug!(path = %output.display(), bytes = data.len(), "writing dump");
    write_output(output, &data)?;

    tracing::info!(
        range = %range,
        bytes = data.len(),
        path = %output.display(),
        "dumped {}",
        source.describe()
    );
    Ok(())
}

/// Read the whole range in one call; anything but an exact-length buffer is a failure
fn read_range(source: &dyn MemorySource, range: &AddressRange) -> Result<Vec<u8>, DumpError> {
    let address = range.start();
    let size = range.byte_len();

    tracing::debug!(range = %range, size, "reading from {}", source.describe());

    let data = source
        .read_bytes(address, size)
        .map_err(|source| DumpError::MemoryReadFailure {
            address,
            size,
            source,
        })?;

    if data.len() != size {
        return Err(DumpError::MemoryReadFailure {
            address,
            size,
            source: ReadError::Short {
                address,
                expected: size,
                actual: data.len(),
            },
        });
    }

    Ok(data)
}

/// Create/truncate `path` and write `data` in full
fn write_output(path: &Path, data: &[u8]) -> Result<(), DumpError> {
    let file = File::create(path).map_err(|source| DumpError::FileWriteFailure {
        path: path.to_path_buf(),
        source,
    })?;

    finish_output(path, file, data)
}

/// Sink that can push its contents down to storage
trait SyncWrite: Write {
    fn sync(&mut self) -> io::Result<()>;
}

impl SyncWrite for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Write `data` to an already opened `writer` for `path`
///
/// On failure the writer is closed first, then a half-written regular file
/// is removed. Devices, FIFOs and anything else at `path` are left alone.
fn finish_output<W: SyncWrite>(path: &Path, mut writer: W, data: &[u8]) -> Result<(), DumpError> {
    let written = write_synced(&mut writer, data);
    drop(writer);

    let Err(source) = written else {
        return Ok(());
    };

    let is_regular = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_file())
        .unwrap_or(false);
    if is_regular {
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), "failed to remove partial dump: {}", cleanup);
        }
    }

    Err(DumpError::FileWriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn write_synced<W: SyncWrite>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    writer.write_all(data)?;
    writer.flush()?;
    writer.sync()
}
