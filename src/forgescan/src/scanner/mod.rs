//! Category scanners
//!
//! Each scanner owns the item index for one category and implements the same
//! four steps: build its index, absorb loot signals, absorb recipe signals and
//! emit its reports. Every scanner receives every signal and ignores the ones
//! that are not for its category.

mod armor;
mod food;
mod ingredient;
mod tags;
mod weapon;

pub use armor::{ArmorInfo, ArmorScanner, ARMOR_UPGRADE_STATION};
pub use food::{FoodInfo, FoodScanner, RAW_MEAT_EXCLUSIONS, RECIPE_INGREDIENT_SLOTS};
pub use ingredient::{IngredientInfo, IngredientScanner};
pub use tags::{biped_slot_names, KeywordSet};
pub use weapon::{WeaponInfo, WeaponScanner, WEAPON_UPGRADE_STATION};

use std::fmt;
use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog};
use crate::index::ItemFlags;
use crate::recipe::{RecipeSignal, StationRole};
use crate::record::{Effect, Record};
use crate::report::Report;
use crate::store::RecordStore;

/// Item category a scanner reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Armor,
    Weapon,
    Food,
    Ingredient,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Armor => "armor",
            Category::Weapon => "weapon",
            Category::Food => "food",
            Category::Ingredient => "ingredient",
        };
        f.write_str(name)
    }
}

/// Per-category aggregation and reporting
pub trait Scanner {
    fn category(&self) -> Category;

    /// Build the item index from the store's winning overrides
    fn index(&mut self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<()>;

    /// An item reachable from some loot list
    fn absorb_loot(&mut self, item: &Arc<Record>, log: &mut AnomalyLog);

    /// A recipe whose station and output resolved
    fn absorb_recipe(&mut self, signal: &RecipeSignal, log: &mut AnomalyLog);

    /// Build this category's reports from the final aggregates
    fn emit(&self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<Vec<Report>>;

    /// Number of indexed items
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One scanner per category, in report order
pub fn default_scanners() -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(ArmorScanner::new()),
        Box::new(WeaponScanner::new()),
        Box::new(FoodScanner::new()),
        Box::new(IngredientScanner::new()),
    ]
}

/// Set the flag a recipe at `station_id` implies
pub(crate) fn flag_station(flags: &mut ItemFlags, station_id: &str, upgrade_station: &str) {
    match StationRole::classify(station_id, upgrade_station) {
        StationRole::Temper => flags.temperable = true,
        StationRole::Craft => flags.craftable = true,
    }
}

/// An effect with its base magic effect resolved
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EffectLine {
    pub name: String,
    pub magnitude: f32,
    pub duration: u32,
}

/// Resolve every effect's base effect name
///
/// Returns `None` and records an anomaly if any base effect is missing, in
/// which case the caller drops the row.
pub(crate) fn resolve_effects(
    store: &dyn RecordStore,
    category: Category,
    item: &Record,
    effects: &[Effect],
    log: &mut AnomalyLog,
) -> crate::Result<Option<Vec<EffectLine>>> {
    let mut lines = Vec::with_capacity(effects.len());

    for effect in effects {
        let Some(base) = store.resolve(&effect.base_effect)? else {
            log.record(Anomaly::UnresolvedReference {
                category,
                item: item.key.clone(),
                reference: effect.base_effect.clone(),
            });
            return Ok(None);
        };

        lines.push(EffectLine {
            name: base.name().unwrap_or_default().to_string(),
            magnitude: effect.magnitude,
            duration: effect.duration,
        });
    }

    Ok(Some(lines))
}

/// Display name of an item, empty when it has none
pub(crate) fn display_name(record: &Record) -> String {
    record.name().unwrap_or_default().to_string()
}

/// Whether an item may appear in reports
pub(crate) fn is_playable(record: &Record) -> bool {
    record.item().is_some_and(|item| !item.non_playable)
}
