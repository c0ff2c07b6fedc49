//! Scan command handler

use crate::config::Config;
use anyhow::{Context, Result};
use forgescan::{LoadOrder, OutputLayout, ScanOutcome};
use std::path::{Path, PathBuf};

/// Inputs for one run after merging flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub data_dir: PathBuf,
    pub load_order: PathBuf,
    pub layout: OutputLayout,
}

impl ScanSettings {
    /// Flags win over config values; the output directory defaults to `.`
    pub fn resolve(
        config: &Config,
        data_dir: Option<PathBuf>,
        load_order: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = data_dir.or_else(|| config.data_dir.clone()).context(
            "No data directory given; pass --data-dir or run `forgescan configure --data-dir DIR`",
        )?;
        let load_order = load_order.or_else(|| config.load_order.clone()).context(
            "No load-order file given; pass --load-order or run `forgescan configure --load-order FILE`",
        )?;
        let output_dir = output
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let layout = config
            .outputs
            .iter()
            .fold(OutputLayout::new(output_dir), |layout, (report, path)| {
                layout.with_file(report.clone(), path.clone())
            });

        Ok(Self {
            data_dir,
            load_order,
            layout,
        })
    }
}

/// Handle the scan command
pub fn handle(
    data_dir: Option<PathBuf>,
    load_order: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let settings = ScanSettings::resolve(&config, data_dir, load_order, output)?;
    tracing::debug!("Scan settings: {:?}", settings);
    let (outcome, written) = execute(&settings)?;
    print_summary(&outcome, &written);
    Ok(())
}

/// Load the snapshot, run every pass and write the reports
pub fn execute(settings: &ScanSettings) -> Result<(ScanOutcome, Vec<PathBuf>)> {
    let store = LoadOrder::load(&settings.data_dir, &settings.load_order).with_context(|| {
        format!(
            "Failed to load {} from {}",
            settings.load_order.display(),
            settings.data_dir.display()
        )
    })?;

    let outcome = forgescan::run(&store).context("Scan failed")?;

    let written = settings
        .layout
        .write_reports(&outcome.reports)
        .with_context(|| format!("Failed to write reports to {}", settings.layout.dir.display()))?;

    Ok((outcome, written))
}

fn print_summary(outcome: &ScanOutcome, written: &[PathBuf]) {
    for (report, path) in outcome.reports.iter().zip(written) {
        println!(
            "{:<18} {:>6} rows  {}",
            report.name(),
            report.len(),
            display_path(path)
        );
    }

    let loot = &outcome.stats.loot;
    let recipes = &outcome.stats.recipes;
    println!();
    println!(
        "Loot: {} lists walked, {} expansions, {} items",
        loot.roots, loot.lists_visited, loot.items_signalled
    );
    println!(
        "Recipes: {} applied, {} disabled, {} unresolved",
        recipes.applied, recipes.disabled, recipes.unresolved
    );
    println!("Anomalies: {}", outcome.anomalies.len());
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../share/sample")
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            data_dir: Some(PathBuf::from("configured")),
            load_order: Some(PathBuf::from("configured.txt")),
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };

        let settings =
            ScanSettings::resolve(&config, Some(PathBuf::from("flag")), None, None).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("flag"));
        assert_eq!(settings.load_order, PathBuf::from("configured.txt"));
        assert_eq!(settings.layout.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_missing_data_dir_is_error() {
        let err = ScanSettings::resolve(&Config::default(), None, None, None).unwrap_err();
        assert!(err.to_string().contains("--data-dir"));
    }

    #[test]
    fn test_output_defaults_to_current_dir() {
        let settings = ScanSettings::resolve(
            &Config::default(),
            Some(PathBuf::from("dump")),
            Some(PathBuf::from("plugins.txt")),
            None,
        )
        .unwrap();
        assert_eq!(settings.layout.path_for("foods"), PathBuf::from("./foods.csv"));
    }

    #[test]
    fn test_config_outputs_reach_layout() {
        let mut config = Config::default();
        config
            .outputs
            .insert("recipes".into(), PathBuf::from("cooking.csv"));

        let settings = ScanSettings::resolve(
            &config,
            Some(PathBuf::from("dump")),
            Some(PathBuf::from("plugins.txt")),
            Some(PathBuf::from("reports")),
        )
        .unwrap();
        assert_eq!(
            settings.layout.path_for("recipes"),
            PathBuf::from("reports/cooking.csv")
        );
        assert_eq!(
            settings.layout.path_for("armors"),
            PathBuf::from("reports/armors.csv")
        );
    }

    #[test]
    fn test_execute_sample() {
        let out = tempfile::tempdir().unwrap();
        let settings = ScanSettings {
            data_dir: sample_dir(),
            load_order: sample_dir().join("plugins.txt"),
            layout: OutputLayout::new(out.path()),
        };

        let (outcome, written) = execute(&settings).unwrap();
        assert_eq!(written.len(), outcome.reports.len());
        for path in &written {
            assert!(path.is_file(), "{} not written", path.display());
        }

        let armors = std::fs::read_to_string(out.path().join("armors.csv")).unwrap();
        assert!(armors.starts_with("Craftable,Temperable,Lootable"));
    }

    #[test]
    fn test_execute_missing_plugin_fails() {
        let data = tempfile::tempdir().unwrap();
        let order = data.path().join("plugins.txt");
        std::fs::write(&order, "Missing.esm\n").unwrap();

        let settings = ScanSettings {
            data_dir: data.path().to_path_buf(),
            load_order: order,
            layout: OutputLayout::new(data.path().join("out")),
        };
        assert!(execute(&settings).is_err());
    }
}
