//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forgescan")]
#[command(about = "Loot and crafting reports for a merged load order", long_about = None)]
pub struct Cli {
    /// Log per-record decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the load order and write every report
    Scan {
        /// Directory holding one JSON or YAML file per plugin
        #[arg(short, long, env = "FORGESCAN_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Load-order file, lowest priority first
        #[arg(short, long)]
        load_order: Option<PathBuf>,

        /// Directory to write reports into (uses configured default if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Set default load-order file
        #[arg(long)]
        load_order: Option<PathBuf>,

        /// Set default output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
