//! Per-category item index
//!
//! Maps a record's [`FormKey`] to its mutable aggregate. Built once from the
//! store's winning overrides; later passes mutate entries in place and only
//! insert when an item shows up that indexing never saw.

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::anomaly::{Anomaly, AnomalyLog, Signal};
use crate::record::{FormKey, Record, RecordKind};
use crate::scanner::Category;
use crate::store::RecordStore;

/// Per-item derived state for one category
pub trait Aggregate {
    /// Fresh aggregate with every derived flag cleared
    fn new(record: Arc<Record>) -> Self;

    /// Winning record snapshot the aggregate was built from
    fn record(&self) -> &Arc<Record>;
}

/// Loot and crafting flags shared by armor and weapons
///
/// Flags are monotone: passes only ever set them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFlags {
    pub lootable: bool,
    pub craftable: bool,
    pub temperable: bool,
}

/// Insertion-ordered map from form key to aggregate
#[derive(Debug)]
pub struct ItemIndex<A> {
    category: Category,
    items: IndexMap<FormKey, A>,
}

impl<A: Aggregate> ItemIndex<A> {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: IndexMap::new(),
        }
    }

    /// Index every winning override of `kind` accepted by `accept`
    ///
    /// A key enumerated twice is recorded as an anomaly; the first wins.
    pub fn build(
        store: &dyn RecordStore,
        category: Category,
        kind: RecordKind,
        accept: impl Fn(&Record) -> bool,
        log: &mut AnomalyLog,
    ) -> crate::Result<Self> {
        let mut index = Self::new(category);

        for record in store.winning_overrides(kind)? {
            if !accept(&record) {
                continue;
            }
            index.insert(record, log);
        }

        tracing::info!("Found {} {} items", index.len(), category);
        Ok(index)
    }

    /// Insert a fresh aggregate, ignoring a key that is already present
    pub fn insert(&mut self, record: Arc<Record>, log: &mut AnomalyLog) {
        match self.items.entry(record.key.clone()) {
            Entry::Occupied(entry) => log.record(Anomaly::DuplicateKey {
                category: self.category,
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(A::new(record));
            }
        }
    }

    /// Aggregate for `record`, synthesizing one if indexing never saw it
    pub fn get_or_synthesize(
        &mut self,
        record: &Arc<Record>,
        via: Signal,
        log: &mut AnomalyLog,
    ) -> &mut A {
        let category = self.category;
        match self.items.entry(record.key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log.record(Anomaly::NotIndexed {
                    category,
                    key: entry.key().clone(),
                    via,
                });
                entry.insert(A::new(Arc::clone(record)))
            }
        }
    }

    pub fn get(&self, key: &FormKey) -> Option<&A> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &FormKey) -> bool {
        self.items.contains_key(key)
    }

    /// Aggregates in insertion order
    pub fn values(&self) -> impl Iterator<Item = &A> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn category(&self) -> Category {
        self.category
    }
}
