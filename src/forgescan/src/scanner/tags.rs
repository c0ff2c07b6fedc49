//! Keyword slot decomposition and biped slot names

use crate::anomaly::{Anomaly, AnomalyLog};
use crate::record::{Record, RecordKind};
use crate::scanner::Category;
use crate::store::RecordStore;

/// An item's keyword editor ids, deduplicated in source order
///
/// Named report slots take their keyword out of the set so that whatever is
/// left over can go to the catch-all columns without repeating anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    tags: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for tag in tags {
            let tag = tag.into();
            if !set.tags.contains(&tag) {
                set.tags.push(tag);
            }
        }
        set
    }

    /// Resolve an item's keywords
    ///
    /// A keyword that cannot be resolved drops the item: an anomaly is
    /// recorded and `None` returned. Keywords without an editor id are skipped.
    pub fn resolve(
        store: &dyn RecordStore,
        category: Category,
        item: &Record,
        log: &mut AnomalyLog,
    ) -> crate::Result<Option<Self>> {
        let keys = item.item().map(|i| i.keywords.as_slice()).unwrap_or_default();
        let mut editor_ids = Vec::with_capacity(keys.len());

        for key in keys {
            let keyword = store
                .resolve(key)?
                .filter(|k| k.kind() == RecordKind::Keyword);
            let Some(keyword) = keyword else {
                log.record(Anomaly::UnresolvedReference {
                    category,
                    item: item.key.clone(),
                    reference: key.clone(),
                });
                return Ok(None);
            };
            if let Some(editor_id) = &keyword.editor_id {
                editor_ids.push(editor_id.clone());
            }
        }

        Ok(Some(Self::new(editor_ids)))
    }

    /// Remove and return the first tag matching `pred`
    pub fn take_first(&mut self, pred: impl Fn(&str) -> bool) -> Option<String> {
        let pos = self.tags.iter().position(|t| pred(t))?;
        Some(self.tags.remove(pos))
    }

    /// Remove and return the first tag equal to one of `names`
    pub fn take_any(&mut self, names: &[&str]) -> Option<String> {
        self.take_first(|t| names.contains(&t))
    }

    /// Tags not claimed by any slot, in source order
    pub fn residual(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Named biped body slots by bit
const BIPED_SLOTS: [(u32, &str); 17] = [
    (0x0000_0001, "Head"),
    (0x0000_0002, "Hair"),
    (0x0000_0004, "Body"),
    (0x0000_0008, "Hands"),
    (0x0000_0010, "Forearms"),
    (0x0000_0020, "Amulet"),
    (0x0000_0040, "Ring"),
    (0x0000_0080, "Feet"),
    (0x0000_0100, "Calves"),
    (0x0000_0200, "Shield"),
    (0x0000_0400, "Tail"),
    (0x0000_0800, "LongHair"),
    (0x0000_1000, "Circlet"),
    (0x0000_2000, "Ears"),
    (0x0010_0000, "DecapitateHead"),
    (0x0020_0000, "Decapitate"),
    (0x8000_0000, "FX01"),
];

/// Render a first-person slot bitmask as `Head, Hair, 44`
///
/// Bits without a name render as their slot number (bit index + 30).
pub fn biped_slot_names(flags: u32) -> String {
    (0..32u32)
        .filter(|bit| flags & (1 << bit) != 0)
        .map(|bit| {
            let flag = 1u32 << bit;
            BIPED_SLOTS
                .iter()
                .find(|(f, _)| *f == flag)
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| (bit + 30).to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MiscItem, RecordBody};
    use crate::scanner::fixtures::{item_data, key, keyword};
    use crate::store::{LoadOrder, Plugin};

    #[test]
    fn test_take_first_removes_match() {
        let mut set = KeywordSet::new(["ArmorHeavy", "ArmorMaterialIron", "VendorItemArmor"]);

        assert_eq!(
            set.take_first(|t| t.contains("ArmorMaterial")),
            Some("ArmorMaterialIron".to_string())
        );
        assert_eq!(set.take_first(|t| t.contains("ArmorMaterial")), None);
        assert_eq!(set.residual(), &["ArmorHeavy", "VendorItemArmor"]);
    }

    #[test]
    fn test_take_any() {
        let mut set = KeywordSet::new(["Foo", "ArmorBoots", "ArmorHelmet"]);
        assert_eq!(
            set.take_any(&["ArmorHelmet", "ArmorBoots"]),
            Some("ArmorBoots".to_string())
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_new_dedupes_in_order() {
        let set = KeywordSet::new(["B", "A", "B", "C", "A"]);
        assert_eq!(set.residual(), &["B", "A", "C"]);
    }

    #[test]
    fn test_resolve_keywords() {
        let item = Record {
            key: key("000801:Mod.esp"),
            editor_id: None,
            body: RecordBody::MiscItem(MiscItem {
                item: item_data("Thing", 1, 1.0, &["000001:Mod.esp", "000002:Mod.esp"]),
            }),
        };
        let mut unnamed = keyword("000002:Mod.esp", "x");
        unnamed.editor_id = None;
        let store = LoadOrder::from_plugins(vec![Plugin::new(
            "Mod.esp",
            vec![keyword("000001:Mod.esp", "VendorItemClutter"), unnamed],
        )])
        .unwrap();

        let mut log = AnomalyLog::new();
        let set = KeywordSet::resolve(&store, Category::Armor, &item, &mut log)
            .unwrap()
            .unwrap();
        assert_eq!(set.residual(), &["VendorItemClutter"]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_resolve_unresolvable_keyword_drops_item() {
        let item = Record {
            key: key("000801:Mod.esp"),
            editor_id: None,
            body: RecordBody::MiscItem(MiscItem {
                item: item_data("Thing", 1, 1.0, &["000099:Mod.esp"]),
            }),
        };
        let store = LoadOrder::from_plugins(vec![Plugin::new("Mod.esp", vec![])]).unwrap();

        let mut log = AnomalyLog::new();
        let set = KeywordSet::resolve(&store, Category::Weapon, &item, &mut log).unwrap();
        assert!(set.is_none());
        assert!(matches!(
            log.entries()[0],
            Anomaly::UnresolvedReference { category: Category::Weapon, .. }
        ));
    }

    #[test]
    fn test_biped_slot_names() {
        assert_eq!(biped_slot_names(0), "");
        assert_eq!(biped_slot_names(0x4), "Body");
        assert_eq!(biped_slot_names(0x3), "Head, Hair");
        assert_eq!(biped_slot_names(0x4000), "44");
        assert_eq!(biped_slot_names(0x8000_0004), "Body, FX01");
    }
}
