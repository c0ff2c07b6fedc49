//! Armor scanner

use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog, Signal};
use crate::index::{Aggregate, ItemFlags, ItemIndex};
use crate::recipe::RecipeSignal;
use crate::record::{Record, RecordKind};
use crate::report::{Cell, Report};
use crate::scanner::tags::{biped_slot_names, KeywordSet};
use crate::scanner::{display_name, flag_station, is_playable, Category, Scanner};
use crate::store::RecordStore;

/// Station keyword that tempers armor
pub const ARMOR_UPGRADE_STATION: &str = "CraftingSmithingArmorTable";

const ARMOR_CATEGORIES: [&str; 3] = ["ArmorLight", "ArmorHeavy", "ArmorClothing"];
const ARMOR_SLOTS: [&str; 5] = [
    "ArmorBoots",
    "ArmorCuirass",
    "ArmorHelmet",
    "ArmorGauntlets",
    "ArmorShield",
];

const COLUMNS: [&str; 27] = [
    "Craftable",
    "Temperable",
    "Lootable",
    "NotTemplate",
    "Orig Mod",
    "Last Mod",
    "Form ID",
    "Name",
    "Value",
    "Weight",
    "Armor Rating",
    "Material",
    "Type",
    "Category",
    "Slot",
    "Slot Flags",
    "Survival",
    "Vendor Item",
    "Object Effect",
    "Keyword1",
    "Keyword2",
    "Keyword3",
    "Keyword4",
    "Keyword5",
    "Keyword6",
    "Keyword7",
    "Keyword8",
];

#[derive(Debug, Clone)]
pub struct ArmorInfo {
    record: Arc<Record>,
    pub flags: ItemFlags,
}

impl Aggregate for ArmorInfo {
    fn new(record: Arc<Record>) -> Self {
        Self {
            record,
            flags: ItemFlags::default(),
        }
    }

    fn record(&self) -> &Arc<Record> {
        &self.record
    }
}

#[derive(Debug)]
pub struct ArmorScanner {
    items: ItemIndex<ArmorInfo>,
}

impl Default for ArmorScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmorScanner {
    pub fn new() -> Self {
        Self {
            items: ItemIndex::new(Category::Armor),
        }
    }

    pub fn items(&self) -> &ItemIndex<ArmorInfo> {
        &self.items
    }

    fn row(
        &self,
        info: &ArmorInfo,
        store: &dyn RecordStore,
        log: &mut AnomalyLog,
    ) -> crate::Result<Option<Vec<Cell>>> {
        let record = &info.record;
        let Some(armor) = record.as_armor() else {
            return Ok(None);
        };
        let Some(mut keywords) = KeywordSet::resolve(store, Category::Armor, record, log)? else {
            return Ok(None);
        };

        let category = keywords.take_any(&ARMOR_CATEGORIES);
        let material = keywords.take_first(|k| k.contains("ArmorMaterial"));
        let slot = keywords.take_any(&ARMOR_SLOTS);
        let survival = keywords.take_first(|k| k.starts_with("Survival"));
        let vendor_item = keywords.take_first(|k| k.starts_with("VendorItem"));

        let object_effect = match &armor.object_effect {
            Some(key) => match store.resolve(key)? {
                Some(effect) => effect.editor_id.clone(),
                None => {
                    log.record(Anomaly::UnresolvedReference {
                        category: Category::Armor,
                        item: record.key.clone(),
                        reference: key.clone(),
                    });
                    return Ok(None);
                }
            },
            None => None,
        };

        let last_mod = store.winning_plugin(&record.key)?;
        let body = armor.body_template.as_ref();
        let slot_flags = body
            .map(|b| biped_slot_names(b.first_person_flags))
            .unwrap_or_default();

        let mut row = vec![
            Cell::from(info.flags.craftable),
            Cell::from(info.flags.temperable),
            Cell::from(info.flags.lootable),
            Cell::from(armor.template.is_none()),
            Cell::plain(record.key.origin()),
            Cell::plain(last_mod),
            Cell::plain(record.key.id_hex()),
            Cell::text(display_name(record)),
            Cell::plain(armor.item.value),
            Cell::plain(armor.item.weight),
            Cell::plain(armor.armor_rating),
            Cell::from(material),
            Cell::from(body.and_then(|b| b.armor_type.clone())),
            Cell::from(category),
            Cell::from(slot),
            Cell::text(slot_flags),
            Cell::from(survival),
            Cell::from(vendor_item),
            Cell::from(object_effect),
        ];
        row.extend(keywords.residual().iter().map(Cell::plain));

        Ok(Some(row))
    }
}

impl Scanner for ArmorScanner {
    fn category(&self) -> Category {
        Category::Armor
    }

    fn index(&mut self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<()> {
        self.items = ItemIndex::build(store, Category::Armor, RecordKind::Armor, |_| true, log)?;
        Ok(())
    }

    fn absorb_loot(&mut self, item: &Arc<Record>, log: &mut AnomalyLog) {
        if item.kind() != RecordKind::Armor {
            return;
        }
        self.items
            .get_or_synthesize(item, Signal::Loot, log)
            .flags
            .lootable = true;
    }

    fn absorb_recipe(&mut self, signal: &RecipeSignal, log: &mut AnomalyLog) {
        if signal.output.kind() != RecordKind::Armor {
            return;
        }
        let info = self
            .items
            .get_or_synthesize(&signal.output, Signal::Recipe, log);
        flag_station(&mut info.flags, &signal.station_id, ARMOR_UPGRADE_STATION);
    }

    fn emit(&self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<Vec<Report>> {
        let mut report = Report::with_columns("armors", &COLUMNS);

        for info in self.items.values().filter(|i| is_playable(&i.record)) {
            if let Some(row) = self.row(info, store, log)? {
                report.push_row(row);
            }
        }

        tracing::info!("Emitting {} armor rows", report.len());
        Ok(vec![report])
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
