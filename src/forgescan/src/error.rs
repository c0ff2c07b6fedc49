//! Error types
//!
//! Only unrecoverable failures live here. Data-quality problems the engine
//! works around are [`crate::Anomaly`] values instead.

use std::path::PathBuf;

use crate::record::{FormKey, ModKey};

/// Errors raised by a record store while loading or resolving records
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Invalid form key: {0}")]
    InvalidFormKey(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No data file for plugin {0} (looked for .json, .yaml, .yml)")]
    MissingPlugin(ModKey),

    #[error("Plugin {0} is listed more than once in the load order")]
    DuplicatePlugin(ModKey),

    #[error("Record {key} in {plugin} overrides a record from a plugin that is not loaded before it")]
    OrphanedOverride { key: FormKey, plugin: ModKey },
}

/// Errors from a scan run
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Record {0} has no origin plugin in the load order")]
    NoOrigins(FormKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
