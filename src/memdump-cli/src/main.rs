mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "memdump=debug"
    } else {
        "memdump=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Dump {
            pid,
            process,
            start,
            end,
        } => {
            let args = commands::dump::DumpArgs {
                pid,
                process,
                start,
                end,
            };
            commands::dump::handle(&args)?;
        }

        Commands::Configure {
            start,
            end,
            process,
            show,
        } => {
            commands::configure::handle(start, end, process, show)?;
        }
    }

    Ok(())
}
