//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up memdump defaults.

use crate::config::Config;
use anyhow::Result;

/// Handle the configure command
///
/// # Arguments
/// * `start` - Optional default start address
/// * `end` - Optional default end address (exclusive)
/// * `process` - Optional default process name
/// * `show` - If true, show current configuration
pub fn handle(
    start: Option<u64>,
    end: Option<u64>,
    process: Option<String>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, start, end, process) {
        config.save()?;
        println!("Configuration saved");
        show_config(&config);
    } else {
        show_usage();
    }

    Ok(())
}

/// Apply any given values; returns whether something changed
fn apply(config: &mut Config, start: Option<u64>, end: Option<u64>, process: Option<String>) -> bool {
    let changed = start.is_some() || end.is_some() || process.is_some();

    if start.is_some() {
        config.start = start;
    }
    if end.is_some() {
        config.end = end;
    }
    if process.is_some() {
        config.process = process;
    }

    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    match (config.start, config.end) {
        (Some(start), Some(end)) => println!("Range: {:#x}..{:#x}", start, end),
        (Some(start), None) => println!("Range: {:#x}..(unset)", start),
        (None, Some(end)) => println!("Range: (unset)..{:#x}", end),
        (None, None) => println!("No range configured"),
    }

    match &config.process {
        Some(name) => println!("Process: {}", name),
        None => println!("No process configured"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn show_usage() {
    println!("Usage: memdump configure [--start <ADDR>] [--end <ADDR>] [--process <NAME>]");
    println!("       memdump configure --show");
}
