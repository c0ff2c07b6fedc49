//! Record store capability and the snapshot-backed load order
//!
//! The engine only ever talks to [`RecordStore`]. [`LoadOrder`] is the
//! implementation shipped with the crate: a fully merged, in-memory snapshot
//! of every plugin's records, loaded from JSON or YAML dumps.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, StoreError};
use crate::record::{FormKey, ModKey, Record, RecordKind};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read access to a resolved load order
///
/// Implementations must be deterministic for a fixed load order.
pub trait RecordStore {
    /// Winning version of every record of one kind
    fn winning_overrides(&self, kind: RecordKind) -> StoreResult<Vec<Arc<Record>>>;

    /// Resolve a reference to its winning record; `Ok(None)` if nothing has that key
    fn resolve(&self, key: &FormKey) -> StoreResult<Option<Arc<Record>>>;

    /// Every plugin holding a version of the record, winning plugin first
    fn resolve_all_origins(&self, key: &FormKey) -> StoreResult<Vec<ModKey>>;

    /// Plugin whose version of the record wins
    fn winning_plugin(&self, key: &FormKey) -> crate::Result<ModKey> {
        self.resolve_all_origins(key)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoOrigins(key.clone()))
    }
}

/// One plugin's records, in file order
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: ModKey,
    pub records: Vec<Record>,
}

impl Plugin {
    pub fn new(name: impl Into<ModKey>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// On-disk layout of a plugin dump
#[derive(Debug, Deserialize)]
struct PluginFile {
    #[serde(default)]
    records: Vec<Record>,
}

/// Data file extensions tried for each plugin, in order
const PLUGIN_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A merged load order held in memory
#[derive(Debug, Default)]
pub struct LoadOrder {
    /// Plugins from lowest to highest priority
    plugins: Vec<ModKey>,
    /// Keys each plugin defines or overrides, in file order
    plugin_keys: Vec<Vec<FormKey>>,
    /// Every version of a record, ascending plugin priority
    versions: HashMap<FormKey, Vec<(usize, Arc<Record>)>>,
}

impl LoadOrder {
    /// Build from plugins ordered lowest priority first
    pub fn from_plugins(plugins: Vec<Plugin>) -> StoreResult<Self> {
        let mut order = LoadOrder::default();
        let mut loaded: HashSet<ModKey> = HashSet::new();

        for (index, plugin) in plugins.into_iter().enumerate() {
            if !loaded.insert(plugin.name.clone()) {
                return Err(StoreError::DuplicatePlugin(plugin.name));
            }

            let mut keys = Vec::with_capacity(plugin.records.len());
            for record in plugin.records {
                if !loaded.contains(record.key.origin()) {
                    return Err(StoreError::OrphanedOverride {
                        key: record.key,
                        plugin: plugin.name,
                    });
                }

                let key = record.key.clone();
                let versions = order.versions.entry(key.clone()).or_default();
                match versions.last_mut() {
                    Some((owner, existing)) if *owner == index => {
                        tracing::warn!(
                            "{} defines {} more than once; keeping the later entry",
                            plugin.name,
                            key
                        );
                        *existing = Arc::new(record);
                    }
                    _ => {
                        versions.push((index, Arc::new(record)));
                        keys.push(key);
                    }
                }
            }

            order.plugins.push(plugin.name);
            order.plugin_keys.push(keys);
        }

        Ok(order)
    }

    /// Load plugin dumps from `data_dir` in the order listed by `load_order_file`
    pub fn load(data_dir: &Path, load_order_file: &Path) -> StoreResult<Self> {
        let names = read_load_order(load_order_file)?;
        Self::load_plugins(data_dir, &names)
    }

    /// Load the named plugins (lowest priority first) from `data_dir`
    pub fn load_plugins(data_dir: &Path, names: &[ModKey]) -> StoreResult<Self> {
        let mut plugins = Vec::with_capacity(names.len());

        for name in names {
            let path = find_plugin_file(data_dir, name)
                .ok_or_else(|| StoreError::MissingPlugin(name.clone()))?;
            let file = read_plugin_file(&path)?;
            tracing::debug!("Loaded {} records from {}", file.records.len(), path.display());
            plugins.push(Plugin::new(name.clone(), file.records));
        }

        let order = Self::from_plugins(plugins)?;
        tracing::info!(
            "Loaded {} plugins ({} distinct records)",
            order.plugins.len(),
            order.versions.len()
        );
        Ok(order)
    }

    /// Plugins from lowest to highest priority
    pub fn plugins(&self) -> &[ModKey] {
        &self.plugins
    }

    /// Number of distinct records across all plugins
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl RecordStore for LoadOrder {
    fn winning_overrides(&self, kind: RecordKind) -> StoreResult<Vec<Arc<Record>>> {
        let mut seen: HashSet<&FormKey> = HashSet::new();
        let mut winners = Vec::new();

        // The first plugin (from the top) holding a key is the one that wins it
        for (index, keys) in self.plugin_keys.iter().enumerate().rev() {
            for key in keys {
                if !seen.insert(key) {
                    continue;
                }
                let record = self.versions.get(key).and_then(|versions| {
                    versions
                        .iter()
                        .find(|(owner, _)| *owner == index)
                        .map(|(_, record)| record)
                });
                if let Some(record) = record {
                    if record.kind() == kind {
                        winners.push(Arc::clone(record));
                    }
                }
            }
        }

        Ok(winners)
    }

    fn resolve(&self, key: &FormKey) -> StoreResult<Option<Arc<Record>>> {
        Ok(self
            .versions
            .get(key)
            .and_then(|versions| versions.last())
            .map(|(_, record)| Arc::clone(record)))
    }

    fn resolve_all_origins(&self, key: &FormKey) -> StoreResult<Vec<ModKey>> {
        Ok(self
            .versions
            .get(key)
            .map(|versions| {
                versions
                    .iter()
                    .rev()
                    .map(|(owner, _)| self.plugins[*owner].clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Parse a load-order file
///
/// One plugin per line. Blank lines and `#` comments are ignored and a
/// leading `*` (the "enabled" marker) is stripped.
pub fn read_load_order(path: &Path) -> StoreResult<Vec<ModKey>> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_load_order(&contents))
}

fn parse_load_order(contents: &str) -> Vec<ModKey> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| ModKey::new(line.trim_start_matches('*').trim()))
        .collect()
}

fn find_plugin_file(data_dir: &Path, name: &ModKey) -> Option<PathBuf> {
    PLUGIN_EXTENSIONS
        .iter()
        .map(|ext| data_dir.join(format!("{}.{}", name, ext)))
        .find(|path| path.is_file())
}

fn read_plugin_file(path: &Path) -> StoreResult<PluginFile> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&contents).map_err(|source| StoreError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}
