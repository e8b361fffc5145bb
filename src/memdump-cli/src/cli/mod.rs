//! CLI argument definitions for memdump

use clap::{Parser, Subcommand};
use memdump::parse_address;

#[derive(Parser)]
#[command(name = "memdump")]
#[command(about = "Dump a process memory range to dump.bin", long_about = None)]
pub struct Cli {
    /// Log each step of the dump
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read [start, end) from a running process and write it to dump.bin
    #[command(visible_alias = "d")]
    Dump {
        /// PID of the process to read from
        #[arg(short, long, conflicts_with = "process")]
        pid: Option<u32>,

        /// Process name to search for (uses configured default if not provided)
        #[arg(short = 'n', long)]
        process: Option<String>,

        /// First address of the range, hex (0x...) or decimal
        #[arg(short, long, value_parser = parse_address)]
        start: Option<u64>,

        /// End of the range (exclusive), hex (0x...) or decimal
        #[arg(short, long, value_parser = parse_address)]
        end: Option<u64>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default start address
        #[arg(long, value_parser = parse_address)]
        start: Option<u64>,

        /// Set default end address (exclusive)
        #[arg(long, value_parser = parse_address)]
        end: Option<u64>,

        /// Set default process name
        #[arg(long)]
        process: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
