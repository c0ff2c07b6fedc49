//! Food scanner
//!
//! Tracks every recipe that produces a food item and emits two reports: one
//! row per food, and one row per food and recipe pair with the recipe's
//! ingredients and decoded conditions.

use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog, Signal};
use crate::conditions::{self, DecodedConditions};
use crate::index::{Aggregate, ItemIndex};
use crate::recipe::RecipeSignal;
use crate::record::{Record, RecordBody, RecordKind};
use crate::report::{Cell, Report};
use crate::scanner::tags::KeywordSet;
use crate::scanner::{display_name, is_playable, resolve_effects, Category, Scanner};
use crate::store::RecordStore;

/// Ingredient columns in the recipe report
pub const RECIPE_INGREDIENT_SLOTS: usize = 13;

/// Recipes using any of these ingredients are left out of the recipe report
pub const RAW_MEAT_EXCLUSIONS: [&str; 4] = [
    "Raw Dragon Meat",
    "Raw Chaurus Meat",
    "Raw Troll Meat",
    "Raw Spider Meat",
];

const FOOD_EFFECT_SLOTS: usize = 4;

const FOOD_COLUMNS: [&str; 17] = [
    "Mod",
    "Form ID",
    "Name",
    "Value",
    "Weight",
    "Effect1",
    "Effect2",
    "Effect3",
    "Effect4",
    "Warmth",
    "VendorItem",
    "Other1",
    "Other2",
    "Other3",
    "Other4",
    "Other5",
    "Other6",
];

fn recipe_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        "Mod",
        "Form ID",
        "Name",
        "Workbench",
        "Value",
        "Created Count",
        "Value Delta",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    for n in 1..=RECIPE_INGREDIENT_SLOTS {
        columns.push(format!("Ing{}", n));
        columns.push(format!("Ing{} Cnt", n));
        columns.push(format!("Ing{} Val", n));
    }

    columns.extend(["Skill Level", "Declutter", "Conditions"].map(String::from));
    columns
}

#[derive(Debug, Clone)]
pub struct FoodInfo {
    record: Arc<Record>,
    /// Recipes producing this food, in encounter order
    pub recipes: Vec<RecipeSignal>,
}

impl Aggregate for FoodInfo {
    fn new(record: Arc<Record>) -> Self {
        Self {
            record,
            recipes: Vec::new(),
        }
    }

    fn record(&self) -> &Arc<Record> {
        &self.record
    }
}

/// One resolved recipe ingredient
#[derive(Debug, Clone, PartialEq)]
struct IngredientLine {
    name: String,
    count: i32,
    value: u32,
}

fn is_food(record: &Record) -> bool {
    record.as_ingestible().is_some_and(|i| i.food)
}

#[derive(Debug)]
pub struct FoodScanner {
    items: ItemIndex<FoodInfo>,
}

impl Default for FoodScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodScanner {
    pub fn new() -> Self {
        Self {
            items: ItemIndex::new(Category::Food),
        }
    }

    pub fn items(&self) -> &ItemIndex<FoodInfo> {
        &self.items
    }

    fn food_row(
        &self,
        info: &FoodInfo,
        store: &dyn RecordStore,
        log: &mut AnomalyLog,
    ) -> crate::Result<Option<Vec<Cell>>> {
        let record = &info.record;
        let Some(food) = record.as_ingestible() else {
            return Ok(None);
        };
        let Some(effects) = resolve_effects(store, Category::Food, record, &food.effects, log)?
        else {
            return Ok(None);
        };
        let Some(mut keywords) = KeywordSet::resolve(store, Category::Food, record, log)? else {
            return Ok(None);
        };

        let warmth = keywords.take_first(|k| k.starts_with("Frostfall"));
        let vendor_item = keywords.take_first(|k| k.starts_with("VendorItem"));
        let last_mod = store.winning_plugin(&record.key)?;

        let mut row = vec![
            Cell::plain(last_mod),
            Cell::plain(record.key.id_hex()),
            Cell::text(display_name(record)),
            Cell::plain(food.item.value),
            Cell::plain(food.item.weight),
        ];
        for slot in 0..FOOD_EFFECT_SLOTS {
            row.push(match effects.get(slot) {
                Some(e) => Cell::text(format!("{} ({} : {})", e.name, e.magnitude, e.duration)),
                None => Cell::empty(),
            });
        }
        row.push(Cell::from(warmth));
        row.push(Cell::from(vendor_item));
        row.extend(keywords.residual().iter().map(Cell::plain));

        Ok(Some(row))
    }

    fn recipe_row(
        &self,
        info: &FoodInfo,
        signal: &RecipeSignal,
        store: &dyn RecordStore,
        log: &mut AnomalyLog,
    ) -> crate::Result<Option<Vec<Cell>>> {
        let food = &info.record;
        let recipe = &signal.recipe;
        let Some(data) = recipe.as_recipe() else {
            return Ok(None);
        };
        let food_value = food.item().map(|i| i.value).unwrap_or_default();

        let Some(ingredients) = resolve_ingredients(store, recipe, log)? else {
            return Ok(None);
        };
        if let Some(meat) = ingredients
            .iter()
            .find(|i| RAW_MEAT_EXCLUSIONS.contains(&i.name.as_str()))
        {
            tracing::debug!("Excluding recipe {}: uses {}", recipe.key, meat.name);
            return Ok(None);
        }

        let rendered = data
            .conditions
            .iter()
            .map(|c| conditions::render(store, c))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(DecodedConditions {
            declutter,
            skill_level,
            generic,
        }) = conditions::decode(rendered)
        else {
            tracing::debug!("Excluding recipe {}: gated by its conditions", recipe.key);
            return Ok(None);
        };

        let spent: i64 = ingredients
            .iter()
            .map(|i| i64::from(i.count) * i64::from(i.value))
            .sum();
        let value_delta = i64::from(data.created_count) * i64::from(food_value) - spent;

        let last_mod = store.winning_plugin(&recipe.key)?;

        let mut row = vec![
            Cell::plain(last_mod),
            Cell::plain(recipe.key.id_hex()),
            Cell::text(display_name(food)),
            Cell::plain(&signal.station_id),
            Cell::plain(food_value),
            Cell::plain(data.created_count),
            Cell::plain(value_delta),
        ];
        for ingredient in &ingredients {
            row.push(Cell::text(ingredient.name.clone()));
            row.push(Cell::plain(ingredient.count));
            row.push(Cell::plain(ingredient.value));
        }
        if ingredients.len() > RECIPE_INGREDIENT_SLOTS {
            tracing::warn!(
                "Recipe {} has {} ingredients; columns after Ing{} will not line up",
                recipe.key,
                ingredients.len(),
                RECIPE_INGREDIENT_SLOTS
            );
        }
        let padding = 3 * RECIPE_INGREDIENT_SLOTS.saturating_sub(ingredients.len());
        row.extend(std::iter::repeat_with(Cell::empty).take(padding));

        row.push(Cell::plain(skill_level));
        row.push(Cell::text(declutter));
        row.extend(generic.into_iter().map(Cell::text));

        Ok(Some(row))
    }
}

/// Resolve a recipe's ingredient names and values
///
/// An ingredient that does not resolve drops the recipe row. One that is not
/// an ingestible, ingredient or misc item is kept under its editor id with a
/// value of zero.
fn resolve_ingredients(
    store: &dyn RecordStore,
    recipe: &Record,
    log: &mut AnomalyLog,
) -> crate::Result<Option<Vec<IngredientLine>>> {
    let Some(data) = recipe.as_recipe() else {
        return Ok(Some(Vec::new()));
    };
    let mut lines = Vec::with_capacity(data.items.len());

    for entry in &data.items {
        let Some(item) = store.resolve(&entry.item)? else {
            log.record(Anomaly::UnresolvedReference {
                category: Category::Food,
                item: recipe.key.clone(),
                reference: entry.item.clone(),
            });
            return Ok(None);
        };

        let (name, value) = match &item.body {
            RecordBody::Ingestible(_) | RecordBody::Ingredient(_) | RecordBody::MiscItem(_) => {
                let value = item.item().map(|i| i.value).unwrap_or_default();
                (display_name(&item), value)
            }
            _ => {
                log.record(Anomaly::UnknownIngredientKind {
                    recipe: recipe.key.clone(),
                    ingredient: item.key.clone(),
                });
                (item.label(), 0)
            }
        };

        lines.push(IngredientLine {
            name,
            count: entry.count,
            value,
        });
    }

    Ok(Some(lines))
}

impl Scanner for FoodScanner {
    fn category(&self) -> Category {
        Category::Food
    }

    fn index(&mut self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<()> {
        self.items = ItemIndex::build(store, Category::Food, RecordKind::Ingestible, is_food, log)?;
        Ok(())
    }

    fn absorb_loot(&mut self, _item: &Arc<Record>, _log: &mut AnomalyLog) {}

    fn absorb_recipe(&mut self, signal: &RecipeSignal, log: &mut AnomalyLog) {
        if !is_food(&signal.output) {
            return;
        }
        self.items
            .get_or_synthesize(&signal.output, Signal::Recipe, log)
            .recipes
            .push(signal.clone());
    }

    fn emit(&self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<Vec<Report>> {
        let mut foods = Report::with_columns("foods", &FOOD_COLUMNS);
        let mut recipes = Report::new("recipes", recipe_columns());

        for info in self.items.values().filter(|i| is_playable(&i.record)) {
            if let Some(row) = self.food_row(info, store, log)? {
                foods.push_row(row);
            }
        }

        for info in self.items.values().filter(|i| is_playable(&i.record)) {
            for signal in &info.recipes {
                if let Some(row) = self.recipe_row(info, signal, store, log)? {
                    recipes.push_row(row);
                }
            }
        }

        tracing::info!(
            "Emitting {} food rows and {} recipe rows",
            foods.len(),
            recipes.len()
        );
        Ok(vec![foods, recipes])
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeResolver;
    use crate::record::{
        CompareOperator, Comparison, Condition, ConstructibleObject, Effect, FormKey, Ingestible,
        Ingredient, MiscItem, RecipeItem,
    };
    use crate::scanner::fixtures::{item_data, keyword, magic_effect};
    use crate::store::{LoadOrder, Plugin};

    const MOD: &str = "Food.esp";

    fn k(local: u32) -> FormKey {
        FormKey::new(MOD, local).unwrap()
    }

    fn ingestible(local: u32, name: &str, value: u32, food: bool) -> Record {
        Record {
            key: k(local),
            editor_id: Some(name.replace(' ', "")),
            body: RecordBody::Ingestible(Ingestible {
                item: item_data(name, value, 0.5, &[]),
                food,
                effects: vec![Effect {
                    base_effect: k(0x50),
                    magnitude: 10.0,
                    duration: 720,
                }],
            }),
        }
    }

    fn ingredient(local: u32, name: &str, value: u32) -> Record {
        Record {
            key: k(local),
            editor_id: None,
            body: RecordBody::Ingredient(Ingredient {
                item: item_data(name, value, 0.1, &[]),
                effects: vec![],
            }),
        }
    }

    fn cooking(local: u32, output: u32, items: &[(u32, i32)], conditions: Vec<Condition>) -> Record {
        Record {
            key: k(local),
            editor_id: None,
            body: RecordBody::ConstructibleObject(ConstructibleObject {
                created_object: Some(k(output)),
                created_count: 2,
                workbench: Some(k(0x40)),
                items: items
                    .iter()
                    .map(|(item, count)| RecipeItem {
                        item: k(*item),
                        count: *count,
                    })
                    .collect(),
                conditions,
            }),
        }
    }

    fn base_records() -> Vec<Record> {
        vec![
            keyword("000040:Food.esp", "CraftingCookpot"),
            magic_effect("000050:Food.esp", "Restore Health"),
            ingestible(0x100, "Vegetable Soup", 5, true),
            ingestible(0x101, "Potion of Healing", 30, false),
            ingredient(0x200, "Leek", 1),
            ingredient(0x201, "Raw Troll Meat", 10),
            Record {
                key: k(0x202),
                editor_id: Some("Salt".into()),
                body: RecordBody::MiscItem(MiscItem {
                    item: item_data("Salt Pile", 2, 0.1, &[]),
                }),
            },
        ]
    }

    fn scan(records: Vec<Record>) -> (FoodScanner, LoadOrder, AnomalyLog) {
        let store = LoadOrder::from_plugins(vec![Plugin::new(MOD, records)]).unwrap();
        let mut log = AnomalyLog::new();
        let mut scanner = FoodScanner::new();
        scanner.index(&store, &mut log).unwrap();
        RecipeResolver::new(&store)
            .apply_all(&mut log, |signal, log| scanner.absorb_recipe(signal, log))
            .unwrap();
        (scanner, store, log)
    }

    #[test]
    fn test_index_only_food() {
        let (scanner, _, _) = scan(base_records());
        assert_eq!(scanner.len(), 1);
        assert!(scanner.items().contains(&k(0x100)));
    }

    #[test]
    fn test_recipes_accumulate_in_order() {
        let mut records = base_records();
        records.push(cooking(0x300, 0x100, &[(0x200, 2)], vec![]));
        records.push(cooking(0x301, 0x100, &[(0x202, 1)], vec![]));
        records.push(cooking(0x302, 0x101, &[(0x200, 1)], vec![]));

        let (scanner, _, log) = scan(records);
        let soup = scanner.items().get(&k(0x100)).unwrap();
        let keys: Vec<&FormKey> = soup.recipes.iter().map(|s| &s.recipe.key).collect();
        assert_eq!(keys, vec![&k(0x300), &k(0x301)]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_food_row() {
        let (scanner, store, mut log) = scan(base_records());
        let reports = scanner.emit(&store, &mut log).unwrap();
        assert_eq!(reports[0].name(), "foods");

        let row: Vec<String> = reports[0].rows()[0].iter().map(Cell::render).collect();
        assert_eq!(
            row,
            vec![
                "Food.esp",
                "0x000100",
                "\"Vegetable Soup\"",
                "5",
                "0.5",
                "\"Restore Health (10 : 720)\"",
                "",
                "",
                "",
                "",
                "",
            ]
        );
    }

    #[test]
    fn test_recipe_row_value_delta_and_padding() {
        let mut records = base_records();
        records.push(cooking(0x300, 0x100, &[(0x200, 2), (0x202, 1)], vec![]));

        let (scanner, store, mut log) = scan(records);
        let reports = scanner.emit(&store, &mut log).unwrap();
        let recipes = &reports[1];
        assert_eq!(recipes.name(), "recipes");
        assert_eq!(recipes.len(), 1);

        let row = &recipes.rows()[0];
        // 7 leading cells, 13 triples, skill level, declutter
        assert_eq!(row.len(), 7 + 3 * RECIPE_INGREDIENT_SLOTS + 2);
        assert_eq!(row[3].value(), "CraftingCookpot");
        assert_eq!(row[5].value(), "2");
        // 2 * 5 - (2 * 1 + 1 * 2)
        assert_eq!(row[6].value(), "6");
        assert_eq!(row[7].render(), "\"Leek\"");
        assert_eq!(row[10].render(), "\"Salt Pile\"");
        assert_eq!(row[13].render(), "");
        assert_eq!(recipes.column("Skill Level"), Some(row.len() - 2));
    }

    #[test]
    fn test_raw_meat_recipe_excluded() {
        let mut records = base_records();
        records.push(cooking(0x300, 0x100, &[(0x201, 1)], vec![]));

        let (scanner, store, mut log) = scan(records);
        assert_eq!(scanner.items().get(&k(0x100)).unwrap().recipes.len(), 1);

        let reports = scanner.emit(&store, &mut log).unwrap();
        assert!(reports[1].is_empty());
    }

    #[test]
    fn test_recipe_conditions_decoded() {
        let mut records = base_records();
        records.push(Record {
            key: k(0x60),
            editor_id: Some("CACO_FoodCookingSkill25".into()),
            body: RecordBody::Global,
        });
        records.push(Record {
            key: k(0x61),
            editor_id: Some("CACO_PlayerCookingSkillLVL".into()),
            body: RecordBody::Global,
        });
        records.push(cooking(
            0x300,
            0x100,
            &[(0x200, 1)],
            vec![
                Condition {
                    function: "GetItemCount".into(),
                    parameter: Some(k(0x202)),
                    operator: CompareOperator::GreaterThanOrEqualTo,
                    comparison: Comparison::Value(1.0),
                    or: false,
                },
                Condition {
                    function: "GetGlobalValue".into(),
                    parameter: Some(k(0x61)),
                    operator: CompareOperator::GreaterThanOrEqualTo,
                    comparison: Comparison::Global(k(0x60)),
                    or: true,
                },
                Condition {
                    function: "GetIsID".into(),
                    parameter: Some(k(0x100)),
                    operator: CompareOperator::EqualTo,
                    comparison: Comparison::Value(1.0),
                    or: false,
                },
            ],
        ));

        let (scanner, store, mut log) = scan(records);
        let reports = scanner.emit(&store, &mut log).unwrap();
        let row = &reports[1].rows()[0];
        let tail: Vec<String> = row[7 + 3 * RECIPE_INGREDIENT_SLOTS..]
            .iter()
            .map(Cell::render)
            .collect();

        assert_eq!(
            tail,
            vec![
                "25 OR",
                "\"Salt >= 1 AND\"",
                "\"GetIsID(Vegetable Soup) = 1 AND\""
            ]
        );
    }

    #[test]
    fn test_gated_recipe_excluded() {
        let mut records = base_records();
        records.push(Record {
            key: k(0x62),
            editor_id: Some("_Seed_CACO_Loaded".into()),
            body: RecordBody::Global,
        });
        records.push(cooking(
            0x300,
            0x100,
            &[(0x200, 1)],
            vec![Condition {
                function: "GetGlobalValue".into(),
                parameter: Some(k(0x62)),
                operator: CompareOperator::NotEqualTo,
                comparison: Comparison::Value(2.0),
                or: false,
            }],
        ));

        let (scanner, store, mut log) = scan(records);
        let reports = scanner.emit(&store, &mut log).unwrap();
        assert!(reports[1].is_empty());
    }

    #[test]
    fn test_unknown_ingredient_kind_kept_with_zero_value() {
        let mut records = base_records();
        records.push(cooking(0x300, 0x100, &[(0x40, 1)], vec![]));

        let (scanner, store, mut log) = scan(records);
        let reports = scanner.emit(&store, &mut log).unwrap();
        let row = &reports[1].rows()[0];

        assert_eq!(row[7].value(), "CraftingCookpot");
        assert_eq!(row[9].value(), "0");
        assert_eq!(
            log.count(|a| matches!(a, Anomaly::UnknownIngredientKind { .. })),
            1
        );
    }

    #[test]
    fn test_recipe_for_unindexed_food_synthesizes() {
        let mut records = base_records();
        records.push(cooking(0x300, 0x100, &[], vec![]));
        let store = LoadOrder::from_plugins(vec![Plugin::new(MOD, records)]).unwrap();

        let mut log = AnomalyLog::new();
        let mut scanner = FoodScanner::new();
        scanner.index(&store, &mut log).unwrap();

        let signal = RecipeSignal {
            recipe: store.resolve(&k(0x300)).unwrap().unwrap(),
            output: Arc::new(ingestible(0x102, "Apple Pie", 8, true)),
            station_id: "CraftingCookpot".into(),
        };
        scanner.absorb_recipe(&signal, &mut log);

        assert_eq!(scanner.len(), 2);
        assert!(matches!(
            log.entries()[0],
            Anomaly::NotIndexed { category: Category::Food, via: Signal::Recipe, .. }
        ));
    }
}
