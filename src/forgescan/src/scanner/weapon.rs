//! Weapon scanner

use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog, Signal};
use crate::index::{Aggregate, ItemFlags, ItemIndex};
use crate::recipe::RecipeSignal;
use crate::record::{Record, RecordKind};
use crate::report::{Cell, Report};
use crate::scanner::tags::KeywordSet;
use crate::scanner::{display_name, flag_station, is_playable, Category, Scanner};
use crate::store::RecordStore;

/// Station keyword that tempers weapons
pub const WEAPON_UPGRADE_STATION: &str = "CraftingSmithingSharpeningWheel";

const COLUMNS: [&str; 27] = [
    "Craftable",
    "Temperable",
    "Lootable",
    "NotTemplate",
    "Mod",
    "Form ID",
    "Name",
    "Skill",
    "Value",
    "Weight",
    "Damage",
    "Reach",
    "Speed",
    "Crit Dmg",
    "Crit Mult",
    "Type",
    "Material",
    "Vendor Item",
    "Spike",
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
pub struct WeaponInfo {
    record: Arc<Record>,
    pub flags: ItemFlags,
}

impl Aggregate for WeaponInfo {
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
pub struct WeaponScanner {
    items: ItemIndex<WeaponInfo>,
}

impl Default for WeaponScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeaponScanner {
    pub fn new() -> Self {
        Self {
            items: ItemIndex::new(Category::Weapon),
        }
    }

    pub fn items(&self) -> &ItemIndex<WeaponInfo> {
        &self.items
    }

    fn row(
        &self,
        info: &WeaponInfo,
        store: &dyn RecordStore,
        log: &mut AnomalyLog,
    ) -> crate::Result<Option<Vec<Cell>>> {
        let record = &info.record;
        let Some(weapon) = record.as_weapon() else {
            return Ok(None);
        };
        let Some(mut keywords) = KeywordSet::resolve(store, Category::Weapon, record, log)? else {
            return Ok(None);
        };

        let weapon_type = keywords.take_first(|k| k.starts_with("WeapType"));
        let material =
            keywords.take_first(|k| k.contains("WeapMaterial") || k.contains("WeaponMaterial"));
        let vendor_item = keywords.take_first(|k| k.starts_with("VendorItem"));
        let spike = keywords.take_first(|k| k.starts_with("SPIKE"));

        // Templated weapons take everything but their value from the template
        let template = match &weapon.template {
            Some(key) => {
                let resolved = store.resolve(key)?;
                match resolved.as_deref().and_then(Record::as_weapon).cloned() {
                    Some(base) => Some(base),
                    None => {
                        log.record(Anomaly::UnresolvedReference {
                            category: Category::Weapon,
                            item: record.key.clone(),
                            reference: key.clone(),
                        });
                        return Ok(None);
                    }
                }
            }
            None => None,
        };
        let base = template.as_ref().unwrap_or(weapon);

        let last_mod = store.winning_plugin(&record.key)?;

        let mut row = vec![
            Cell::from(info.flags.craftable),
            Cell::from(info.flags.temperable),
            Cell::from(info.flags.lootable),
            Cell::from(weapon.template.is_none()),
            Cell::plain(last_mod),
            Cell::plain(record.key.id_hex()),
            Cell::text(display_name(record)),
            Cell::from(base.skill.clone()),
            Cell::plain(weapon.item.value),
            Cell::plain(base.item.weight),
            Cell::plain(base.damage),
            Cell::plain(base.reach),
            Cell::plain(base.speed),
            Cell::plain(base.crit_damage),
            Cell::plain(base.crit_mult),
            Cell::from(weapon_type),
            Cell::from(material),
            Cell::from(vendor_item),
            Cell::from(spike),
        ];
        row.extend(keywords.residual().iter().map(Cell::plain));

        Ok(Some(row))
    }
}

impl Scanner for WeaponScanner {
    fn category(&self) -> Category {
        Category::Weapon
    }

    fn index(&mut self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<()> {
        self.items = ItemIndex::build(store, Category::Weapon, RecordKind::Weapon, |_| true, log)?;
        Ok(())
    }

    fn absorb_loot(&mut self, item: &Arc<Record>, log: &mut AnomalyLog) {
        if item.kind() != RecordKind::Weapon {
            return;
        }
        self.items
            .get_or_synthesize(item, Signal::Loot, log)
            .flags
            .lootable = true;
    }

    fn absorb_recipe(&mut self, signal: &RecipeSignal, log: &mut AnomalyLog) {
        if signal.output.kind() != RecordKind::Weapon {
            return;
        }
        let info = self
            .items
            .get_or_synthesize(&signal.output, Signal::Recipe, log);
        flag_station(&mut info.flags, &signal.station_id, WEAPON_UPGRADE_STATION);
    }

    fn emit(&self, store: &dyn RecordStore, log: &mut AnomalyLog) -> crate::Result<Vec<Report>> {
        let mut report = Report::with_columns("weapons", &COLUMNS);

        for info in self.items.values().filter(|i| is_playable(&i.record)) {
            if let Some(row) = self.row(info, store, log)? {
                report.push_row(row);
            }
        }

        tracing::info!("Emitting {} weapon rows", report.len());
        Ok(vec![report])
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
