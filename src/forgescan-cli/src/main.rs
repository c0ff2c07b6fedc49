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
        "forgescan=debug"
    } else {
        "forgescan=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Scan {
            data_dir,
            load_order,
            output,
        } => {
            commands::scan::handle(data_dir, load_order, output)?;
        }

        Commands::Configure {
            data_dir,
            load_order,
            output_dir,
            show,
        } => {
            commands::configure::handle(data_dir, load_order, output_dir, show)?;
        }
    }

    Ok(())
}
