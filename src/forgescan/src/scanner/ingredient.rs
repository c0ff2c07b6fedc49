//! Ingredient scanner
//!
//! Ingredients take no part in loot or recipe flags. The scanner only indexes
//! them and lists their effects, once as four effect triples per ingredient and
//! once flattened to one row per effect.

use std::sync::Arc;

use crate::anomaly::AnomalyLog;
use crate::index::{Aggregate, ItemIndex};
use crate::recipe::RecipeSignal;
use crate::record::{ModKey, Record, RecordKind};
use crate::report::{Cell, Report};
use crate::scanner::{
    display_name, is_playable, resolve_effects, Category, EffectLine, Scanner,
};
use crate::store::RecordStore;

const EFFECT_SLOTS: usize = 4;

const HEADER: [&str; 6] = ["Orig Mod", "Last Mod", "Form ID", "Name", "Value", "Weight"];

#[derive(Debug, Clone)]
pub struct IngredientInfo {
    record: Arc<Record>,
}

impl Aggregate for IngredientInfo {
    fn new(record: Arc<Record>) -> Self {
        Self { record }
    }

    fn record(&self) -> &Arc<Record> {
        &self.record
    }
}

#[derive(Debug)]
pub struct IngredientScanner {
    items: ItemIndex<IngredientInfo>,
}

impl Default for IngredientScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientScanner {
    pub fn new() -> Self {
        Self {
            items: ItemIndex::new(Category::Ingredient),
        }
    }

    pub fn items(&self) -> &ItemIndex<IngredientInfo> {
        &self.items
    }
}

fn leading_cells(record: &Record, last_mod: &ModKey) -> Vec<Cell> {
    let item = record.item().cloned().unwrap_or_default();
    vec![
        Cell::plain(record.key.origin()),
        Cell::plain(last_mod),
        Cell::plain(record.key.id_hex()),
        Cell::text(display_name(record)),
        Cell::plain(item.value),
        Cell::plain(item.weight),
    ]
}

fn effect_cells(effect: Option<&EffectLine>) -> [Cell; 3] {
    match effect {
        Some(e) => [
            Cell::text(e.name.clone()),
            Cell::plain(e.magnitude),
            Cell::plain(e.duration),
        ],
        None => [Cell::empty(), Cell::empty(), Cell::empty()],
    }
}

fn wide_columns() -> Vec<String> {
    let mut columns: Vec<String> = HEADER.iter().map(|c| c.to_string()).collect();
    for n in 1..=EFFECT_SLOTS {
        columns.push(format!("Effect Name {}", n));
        columns.push(format!("Effect Mag {}", n));
        columns.push(format!("Effect Dur {}", n));
    }
    columns
}

fn flat_columns() -> Vec<String> {
    HEADER
        .iter()
        .chain(["Effect Name", "Effect Mag", "Effect Dur"].iter())
        .map(|c| c.to_string())
        .collect()
}

impl Scanner for IngredientScanner {
    fn category(&self) -> Category {
        Category::Ingredient
    }

    fn index(&mut self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<()> {
        self.items = ItemIndex::build(
            store,
            Category::Ingredient,
            RecordKind::Ingredient,
            |_| true,
            log,
        )?;
        Ok(())
    }

    fn absorb_loot(&mut self, _item: &Arc<Record>, _log: &mut AnomalyLog) {}

    fn absorb_recipe(&mut self, _signal: &RecipeSignal, _log: &mut AnomalyLog) {}

    fn emit(&self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<Vec<Report>> {
        let mut wide = Report::new("ingredients", wide_columns());
        let mut flat = Report::new("ingredients_flat", flat_columns());

        for info in self.items.values().filter(|i| is_playable(&i.record)) {
            let record = &info.record;
            let effects = record
                .as_ingredient()
                .map(|i| i.effects.as_slice())
                .unwrap_or_default();
            let Some(effects) = resolve_effects(store, Category::Ingredient, record, effects, log)?
            else {
                continue;
            };
            let last_mod = store.winning_plugin(&record.key)?;

            let mut row = leading_cells(record, &last_mod);
            for slot in 0..EFFECT_SLOTS {
                row.extend(effect_cells(effects.get(slot)));
            }
            wide.push_row(row);

            for effect in &effects {
                let mut row = leading_cells(record, &last_mod);
                row.extend(effect_cells(Some(effect)));
                flat.push_row(row);
            }
        }

        tracing::info!(
            "Emitting {} ingredient rows ({} effect rows)",
            wide.len(),
            flat.len()
        );
        Ok(vec![wide, flat])
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
