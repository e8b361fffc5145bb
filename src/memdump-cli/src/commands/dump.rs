//! Dump command handler
//!
//! Resolves the target process and address range from flags and config,
//! then writes the range to `dump.bin`.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use memdump::{AddressRange, MemorySource, ProcessMemory};
use std::path::Path;

/// Output file, relative to the working directory
pub const OUTPUT_PATH: &str = "dump.bin";

/// Flags given to `memdump dump`
#[derive(Debug, Default)]
pub struct DumpArgs {
    pub pid: Option<u32>,
    pub process: Option<String>,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

#[derive(Debug, PartialEq)]
pub enum Target {
    Pid(u32),
    Name(String),
}

/// Handle the dump command
pub fn handle(args: &DumpArgs) -> Result<()> {
    let config = Config::load()?;
    let (target, range) = resolve(args, &config)?;

    let pid = match target {
        Target::Pid(pid) => pid,
        Target::Name(name) => memdump::find_process(&name)?,
    };
    let process = ProcessMemory::attach(pid)?;

    run(&process, &range, Path::new(OUTPUT_PATH))?;
    println!("done.");

    Ok(())
}

/// Merge flags over configured defaults
///
/// Flags win. A PID flag beats any process name.
pub fn resolve(args: &DumpArgs, config: &Config) -> Result<(Target, AddressRange)> {
    let Some(start) = args.start.or(config.start) else {
        bail!("No start address given. Use --start or run `memdump configure --start <ADDR>`");
    };
    let Some(end) = args.end.or(config.end) else {
        bail!("No end address given. Use --end or run `memdump configure --end <ADDR>`");
    };

    let range = AddressRange::new(start, end)
        .with_context(|| format!("Cannot dump {:#x}..{:#x}", start, end))?;

    let target = if let Some(pid) = args.pid {
        Target::Pid(pid)
    } else if let Some(name) = args.process.as_ref().or(config.process.as_ref()) {
        Target::Name(name.clone())
    } else {
        bail!("No process given. Use --pid, --process, or `memdump configure --process <NAME>`");
    };

    Ok((target, range))
}

/// Dump `range` from `source` into `output`
pub fn run(source: &dyn MemorySource, range: &AddressRange, output: &Path) -> Result<()> {
    tracing::debug!(live = source.is_live(), "dumping {} from {}", range, source.describe());

    memdump::dump_range(source, range, output)
        .with_context(|| format!("Failed to dump {} to {}", range, output.display()))
}
