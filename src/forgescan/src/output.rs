//! Where reports are written
//!
//! Every report lands in one output directory as `<report>.csv` unless the
//! layout names a different file for it. Relative overrides resolve against
//! the output directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::report::Report;

/// Names of every report the default scanners emit
pub const REPORT_NAMES: [&str; 6] = [
    "armors",
    "weapons",
    "foods",
    "recipes",
    "ingredients",
    "ingredients_flat",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub dir: PathBuf,
    /// Per-report file overrides, keyed by report name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, PathBuf>,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Send one report to a specific file
    pub fn with_file(mut self, report: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(report.into(), path.into());
        self
    }

    pub fn path_for(&self, report: &str) -> PathBuf {
        match self.files.get(report) {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.dir.join(path),
            None => self.dir.join(format!("{}.csv", report)),
        }
    }

    /// Write every report, returning the paths written in report order
    pub fn write_reports(&self, reports: &[Report]) -> crate::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(reports.len());

        for report in reports {
            let path = self.path_for(report.name());
            write_report(&path, report)?;
            tracing::info!("Wrote {} rows to {}", report.len(), path.display());
            written.push(path);
        }

        Ok(written)
    }
}

fn write_report(path: &Path, report: &Report) -> crate::Result<()> {
    let io_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = fs::File::create(path).map_err(io_err)?;
    report.write_to(BufWriter::new(file))
}
