//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up forgescan defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(
    data_dir: Option<PathBuf>,
    load_order: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, data_dir, load_order, output_dir) {
        config.save()?;
        println!("Configuration updated");
        if let Ok(path) = Config::config_path() {
            println!("Config saved to: {}", path.display());
        }
    } else {
        show_usage();
    }

    Ok(())
}

/// Set any provided values, returning whether anything changed
fn apply(
    config: &mut Config,
    data_dir: Option<PathBuf>,
    load_order: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> bool {
    let mut changed = false;
    for (slot, value) in [
        (&mut config.data_dir, data_dir),
        (&mut config.load_order, load_order),
        (&mut config.output_dir, output_dir),
    ] {
        if let Some(value) = value {
            *slot = Some(value);
            changed = true;
        }
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    let show = |label: &str, value: &Option<PathBuf>| match value {
        Some(path) => println!("{:<12} {}", label, path.display()),
        None => println!("{:<12} (not set)", label),
    };
    show("Data dir:", &config.data_dir);
    show("Load order:", &config.load_order);
    show("Output dir:", &config.output_dir);

    for (report, path) in &config.outputs {
        println!("  {:<16} -> {}", report, path.display());
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: forgescan configure --data-dir DIR --load-order FILE [--output-dir DIR]");
    println!("   or: forgescan configure --show");
    println!();
    println!("Per-report file names can be set under [outputs] in the config file,");
    println!("e.g. recipes = \"food_recipes.csv\".");
}
