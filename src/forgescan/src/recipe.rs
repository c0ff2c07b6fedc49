//! Crafting recipe resolution
//!
//! Resolves each recipe's crafting-station keyword and output item and hands
//! the resolved triple to a dispatch callback. Recipes whose station is
//! missing, unresolvable or disabled never reach the callback.

use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog};
use crate::record::{Record, RecordKind};
use crate::store::RecordStore;

/// Editor-id prefix of station keywords that hide a recipe in game
pub const CRAFTING_DISABLED_PREFIX: &str = "CraftingDisabled";

/// A recipe with its station and output resolved
#[derive(Debug, Clone)]
pub struct RecipeSignal {
    pub recipe: Arc<Record>,
    pub output: Arc<Record>,
    /// Editor id of the station keyword
    pub station_id: String,
}

/// Which flag a station sets on the item it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationRole {
    /// The category's upgrade bench (sharpening wheel, armor table)
    Temper,
    /// Any other station
    Craft,
}

impl StationRole {
    pub fn classify(station_id: &str, upgrade_station: &str) -> Self {
        if station_id == upgrade_station {
            StationRole::Temper
        } else {
            StationRole::Craft
        }
    }
}

/// Counters for one recipe pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeStats {
    pub applied: usize,
    pub disabled: usize,
    pub unresolved: usize,
}

pub struct RecipeResolver<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> RecipeResolver<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Resolve every winning recipe and dispatch the ones that survive
    pub fn apply_all<F>(&self, log: &mut AnomalyLog, dispatch: F) -> crate::Result<RecipeStats>
    where
        F: FnMut(&RecipeSignal, &mut AnomalyLog),
    {
        let recipes = self.store.winning_overrides(RecordKind::ConstructibleObject)?;
        self.apply_recipes(&recipes, log, dispatch)
    }

    pub fn apply_recipes<F>(
        &self,
        recipes: &[Arc<Record>],
        log: &mut AnomalyLog,
        mut dispatch: F,
    ) -> crate::Result<RecipeStats>
    where
        F: FnMut(&RecipeSignal, &mut AnomalyLog),
    {
        let mut stats = RecipeStats::default();

        for recipe in recipes {
            match self.resolve(recipe, log)? {
                Resolution::Ready(signal) => {
                    stats.applied += 1;
                    dispatch(&signal, log);
                }
                Resolution::Disabled => stats.disabled += 1,
                Resolution::Unresolved => stats.unresolved += 1,
            }
        }

        tracing::info!(
            "Applied {} recipes ({} disabled, {} unresolvable)",
            stats.applied,
            stats.disabled,
            stats.unresolved
        );
        Ok(stats)
    }

    fn resolve(&self, recipe: &Arc<Record>, log: &mut AnomalyLog) -> crate::Result<Resolution> {
        let Some(data) = recipe.as_recipe() else {
            return Ok(Resolution::Unresolved);
        };

        let Some(station_key) = &data.workbench else {
            log.record(Anomaly::MissingStation {
                recipe: recipe.key.clone(),
            });
            return Ok(Resolution::Unresolved);
        };

        let station_id = self
            .store
            .resolve(station_key)?
            .filter(|s| s.kind() == RecordKind::Keyword)
            .and_then(|s| s.editor_id.clone());
        let Some(station_id) = station_id else {
            log.record(Anomaly::UnresolvedStation {
                recipe: recipe.key.clone(),
                station: station_key.clone(),
            });
            return Ok(Resolution::Unresolved);
        };

        if station_id.starts_with(CRAFTING_DISABLED_PREFIX) {
            tracing::debug!("Skipping {}: station {} is disabled", recipe.key, station_id);
            return Ok(Resolution::Disabled);
        }

        let output = match &data.created_object {
            Some(key) => self.store.resolve(key)?,
            None => None,
        };
        let Some(output) = output else {
            log.record(Anomaly::UnresolvedOutput {
                recipe: recipe.key.clone(),
                output: data.created_object.clone(),
            });
            return Ok(Resolution::Unresolved);
        };

        Ok(Resolution::Ready(RecipeSignal {
            recipe: Arc::clone(recipe),
            output,
            station_id,
        }))
    }
}

enum Resolution {
    Ready(RecipeSignal),
    Disabled,
    Unresolved,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ConstructibleObject, FormKey, ItemData, MiscItem, RecordBody};
    use crate::store::{LoadOrder, Plugin};

    fn key(s: &str) -> FormKey {
        s.parse().unwrap()
    }

    fn keyword(k: &str, editor_id: &str) -> Record {
        Record {
            key: key(k),
            editor_id: Some(editor_id.to_string()),
            body: RecordBody::Keyword,
        }
    }

    fn item(k: &str) -> Record {
        Record {
            key: key(k),
            editor_id: None,
            body: RecordBody::MiscItem(MiscItem {
                item: ItemData::default(),
            }),
        }
    }

    fn recipe(k: &str, output: Option<&str>, station: Option<&str>) -> Record {
        Record {
            key: key(k),
            editor_id: None,
            body: RecordBody::ConstructibleObject(ConstructibleObject {
                created_object: output.map(key),
                created_count: 1,
                workbench: station.map(key),
                ..Default::default()
            }),
        }
    }

    fn run(records: Vec<Record>) -> (Vec<RecipeSignal>, AnomalyLog, RecipeStats) {
        let store = LoadOrder::from_plugins(vec![Plugin::new("Mod.esp", records)]).unwrap();
        let mut log = AnomalyLog::new();
        let mut signals = Vec::new();
        let stats = RecipeResolver::new(&store)
            .apply_all(&mut log, |signal, _| signals.push(signal.clone()))
            .unwrap();
        (signals, log, stats)
    }

    #[test]
    fn test_classify_station() {
        assert_eq!(
            StationRole::classify("CraftingSmithingSharpeningWheel", "CraftingSmithingSharpeningWheel"),
            StationRole::Temper
        );
        assert_eq!(
            StationRole::classify("CraftingSmithingForge", "CraftingSmithingSharpeningWheel"),
            StationRole::Craft
        );
    }

    #[test]
    fn test_resolved_recipe_dispatched() {
        let (signals, log, stats) = run(vec![
            keyword("000100:Mod.esp", "CraftingSmithingForge"),
            item("000200:Mod.esp"),
            recipe("000300:Mod.esp", Some("000200:Mod.esp"), Some("000100:Mod.esp")),
        ]);

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].station_id, "CraftingSmithingForge");
        assert_eq!(signals[0].output.key, key("000200:Mod.esp"));
        assert_eq!(stats.applied, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_disabled_station_skipped_silently() {
        let (signals, log, stats) = run(vec![
            keyword("000100:Mod.esp", "CraftingDisabledForge"),
            item("000200:Mod.esp"),
            recipe("000300:Mod.esp", Some("000200:Mod.esp"), Some("000100:Mod.esp")),
        ]);

        assert!(signals.is_empty());
        assert_eq!(stats.disabled, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_missing_station_skipped() {
        let (signals, log, stats) = run(vec![
            item("000200:Mod.esp"),
            recipe("000300:Mod.esp", Some("000200:Mod.esp"), None),
        ]);

        assert!(signals.is_empty());
        assert_eq!(stats.unresolved, 1);
        assert!(matches!(log.entries()[0], Anomaly::MissingStation { .. }));
    }

    #[test]
    fn test_unresolvable_station_skipped() {
        let (signals, log, _) = run(vec![
            item("000200:Mod.esp"),
            recipe("000300:Mod.esp", Some("000200:Mod.esp"), Some("000999:Mod.esp")),
        ]);

        assert!(signals.is_empty());
        assert!(matches!(log.entries()[0], Anomaly::UnresolvedStation { .. }));
    }

    #[test]
    fn test_station_without_editor_id_skipped() {
        let mut station = keyword("000100:Mod.esp", "unused");
        station.editor_id = None;
        let (signals, log, _) = run(vec![
            station,
            item("000200:Mod.esp"),
            recipe("000300:Mod.esp", Some("000200:Mod.esp"), Some("000100:Mod.esp")),
        ]);

        assert!(signals.is_empty());
        assert!(matches!(log.entries()[0], Anomaly::UnresolvedStation { .. }));
    }

    #[test]
    fn test_unresolvable_output_skipped() {
        let (signals, log, stats) = run(vec![
            keyword("000100:Mod.esp", "CraftingSmithingForge"),
            recipe("000300:Mod.esp", Some("000999:Mod.esp"), Some("000100:Mod.esp")),
        ]);

        assert!(signals.is_empty());
        assert_eq!(stats.unresolved, 1);
        assert!(matches!(log.entries()[0], Anomaly::UnresolvedOutput { .. }));
    }
}
