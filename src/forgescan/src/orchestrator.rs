//! Three-pass scan over a load order
//!
//! 1. Every scanner builds its item index.
//! 2. Every loot list is walked and each reachable item goes to every scanner.
//! 3. Every recipe is resolved and each surviving one goes to every scanner.
//!
//! Reports are emitted once all three passes are done.

use std::collections::BTreeMap;

use crate::anomaly::AnomalyLog;
use crate::loot::{LootStats, LootWalker};
use crate::recipe::{RecipeResolver, RecipeStats};
use crate::report::Report;
use crate::scanner::{default_scanners, Category, Scanner};
use crate::store::RecordStore;

/// Counters from one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Items in each category's index after all passes
    pub indexed: BTreeMap<Category, usize>,
    pub loot: LootStats,
    pub recipes: RecipeStats,
}

impl ScanStats {
    pub fn indexed(&self, category: Category) -> usize {
        self.indexed.get(&category).copied().unwrap_or_default()
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct ScanOutcome {
    pub reports: Vec<Report>,
    pub anomalies: AnomalyLog,
    pub stats: ScanStats,
}

impl ScanOutcome {
    pub fn report(&self, name: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.name() == name)
    }
}

/// Runs the scanners over a store
pub struct Orchestrator<'a> {
    store: &'a dyn RecordStore,
    scanners: Vec<Box<dyn Scanner>>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator with one scanner per category
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self::with_scanners(store, default_scanners())
    }

    pub fn with_scanners(store: &'a dyn RecordStore, scanners: Vec<Box<dyn Scanner>>) -> Self {
        Self { store, scanners }
    }

    pub fn run(mut self) -> crate::Result<ScanOutcome> {
        let mut log = AnomalyLog::new();

        tracing::info!("Indexing {} categories", self.scanners.len());
        for scanner in &mut self.scanners {
            scanner.index(self.store, &mut log)?;
        }

        tracing::info!("Walking loot lists");
        let scanners = &mut self.scanners;
        let loot = LootWalker::new(self.store).mark_all(&mut log, |item, log| {
            for scanner in scanners.iter_mut() {
                scanner.absorb_loot(item, log);
            }
        })?;

        tracing::info!("Resolving recipes");
        let scanners = &mut self.scanners;
        let recipes = RecipeResolver::new(self.store).apply_all(&mut log, |signal, log| {
            for scanner in scanners.iter_mut() {
                scanner.absorb_recipe(signal, log);
            }
        })?;

        let mut reports = Vec::new();
        for scanner in &self.scanners {
            reports.extend(scanner.emit(self.store, &mut log)?);
        }

        let indexed = self
            .scanners
            .iter()
            .map(|s| (s.category(), s.len()))
            .collect();

        tracing::info!(
            "Scan complete: {} reports, {} anomalies",
            reports.len(),
            log.len()
        );

        Ok(ScanOutcome {
            reports,
            anomalies: log,
            stats: ScanStats {
                indexed,
                loot,
                recipes,
            },
        })
    }
}

/// Run the default scanners over `store`
pub fn run(store: &dyn RecordStore) -> crate::Result<ScanOutcome> {
    Orchestrator::new(store).run()
}
