//! Loot reachability
//!
//! Walks the graph of leveled (randomized) loot lists depth first and hands
//! every concrete item reachable from a root list to a dispatch callback.
//! Lists may reference each other in cycles; each root walk keeps its own
//! visited set so every list is expanded at most once per root.

use std::collections::HashSet;
use std::sync::Arc;

use crate::anomaly::{Anomaly, AnomalyLog};
use crate::record::{FormKey, Record, RecordKind};
use crate::store::RecordStore;

/// Counters for one loot pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LootStats {
    /// Top-level lists walked
    pub roots: usize,
    /// List expansions across all roots
    pub lists_visited: usize,
    /// Items handed to the dispatch callback
    pub items_signalled: usize,
}

/// Depth-first walker over loot lists
pub struct LootWalker<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> LootWalker<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Walk every winning loot list as a root
    pub fn mark_all<F>(&self, log: &mut AnomalyLog, dispatch: F) -> crate::Result<LootStats>
    where
        F: FnMut(&Arc<Record>, &mut AnomalyLog),
    {
        let roots = self.store.winning_overrides(RecordKind::LeveledItem)?;
        self.mark_reachable(&roots, log, dispatch)
    }

    /// Walk each root with a fresh visited set
    pub fn mark_reachable<F>(
        &self,
        roots: &[Arc<Record>],
        log: &mut AnomalyLog,
        mut dispatch: F,
    ) -> crate::Result<LootStats>
    where
        F: FnMut(&Arc<Record>, &mut AnomalyLog),
    {
        let mut stats = LootStats::default();

        for root in roots {
            let mut visited: HashSet<FormKey> = HashSet::new();
            self.walk(root, &mut visited, &mut stats, log, &mut dispatch)?;
            stats.roots += 1;
        }

        tracing::info!(
            "Walked {} loot lists ({} expansions, {} items signalled)",
            stats.roots,
            stats.lists_visited,
            stats.items_signalled
        );
        Ok(stats)
    }

    fn walk<F>(
        &self,
        root: &Arc<Record>,
        visited: &mut HashSet<FormKey>,
        stats: &mut LootStats,
        log: &mut AnomalyLog,
        dispatch: &mut F,
    ) -> crate::Result<()>
    where
        F: FnMut(&Arc<Record>, &mut AnomalyLog),
    {
        let mut stack = vec![Arc::clone(root)];

        while let Some(list) = stack.pop() {
            let Some(leveled) = list.as_leveled_item() else {
                continue;
            };
            if !visited.insert(list.key.clone()) {
                continue;
            }
            stats.lists_visited += 1;

            let mut nested = Vec::new();
            for entry in &leveled.entries {
                let Some(reference) = &entry.reference else {
                    log.record(Anomaly::NullLootEntry {
                        list: list.key.clone(),
                    });
                    continue;
                };

                let Some(item) = self.store.resolve(reference)? else {
                    log.record(Anomaly::UnresolvedLootEntry {
                        list: list.key.clone(),
                        reference: reference.clone(),
                    });
                    continue;
                };

                if entry.count < 1 {
                    log.record(Anomaly::NonPositiveCount {
                        list: list.key.clone(),
                        item: item.key.clone(),
                        count: entry.count,
                    });
                }

                if item.kind() == RecordKind::LeveledItem {
                    nested.push(item);
                } else {
                    stats.items_signalled += 1;
                    dispatch(&item, log);
                }
            }

            // Reversed so nested lists expand in entry order
            stack.extend(nested.into_iter().rev());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ItemData, LeveledItem, LootEntry, MiscItem, RecordBody};
    use crate::store::{LoadOrder, Plugin};
    use std::collections::HashMap;

    fn key(s: &str) -> FormKey {
        s.parse().unwrap()
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

    fn list(k: &str, entries: &[(Option<&str>, i32)]) -> Record {
        Record {
            key: key(k),
            editor_id: None,
            body: RecordBody::LeveledItem(LeveledItem {
                entries: entries
                    .iter()
                    .map(|(reference, count)| LootEntry {
                        reference: reference.map(key),
                        count: *count,
                    })
                    .collect(),
            }),
        }
    }

    fn order(records: Vec<Record>) -> LoadOrder {
        LoadOrder::from_plugins(vec![Plugin::new("Mod.esp", records)]).unwrap()
    }

    fn run(store: &LoadOrder, roots: &[&str]) -> (HashMap<FormKey, usize>, AnomalyLog, LootStats) {
        let roots: Vec<_> = roots
            .iter()
            .map(|k| store.resolve(&key(k)).unwrap().unwrap())
            .collect();
        let mut log = AnomalyLog::new();
        let mut hits: HashMap<FormKey, usize> = HashMap::new();
        let stats = LootWalker::new(store)
            .mark_reachable(&roots, &mut log, |item, _| {
                *hits.entry(item.key.clone()).or_default() += 1;
            })
            .unwrap();
        (hits, log, stats)
    }

    #[test]
    fn test_nested_lists_reach_items() {
        let store = order(vec![
            item("000001:Mod.esp"),
            item("000002:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000011:Mod.esp"), 1)]),
            list("000011:Mod.esp", &[(Some("000012:Mod.esp"), 1), (Some("000001:Mod.esp"), 1)]),
            list("000012:Mod.esp", &[(Some("000002:Mod.esp"), 2)]),
        ]);

        let (hits, log, stats) = run(&store, &["000010:Mod.esp"]);
        assert!(hits.contains_key(&key("000001:Mod.esp")));
        assert!(hits.contains_key(&key("000002:Mod.esp")));
        assert_eq!(stats.lists_visited, 3);
        assert!(log.is_empty());
    }

    #[test]
    fn test_self_reference_terminates() {
        let store = order(vec![
            item("000001:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000010:Mod.esp"), 1), (Some("000001:Mod.esp"), 1)]),
        ]);

        let (hits, _, stats) = run(&store, &["000010:Mod.esp"]);
        assert_eq!(hits[&key("000001:Mod.esp")], 1);
        assert_eq!(stats.lists_visited, 1);
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let store = order(vec![
            item("000001:Mod.esp"),
            item("000002:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000011:Mod.esp"), 1), (Some("000001:Mod.esp"), 1)]),
            list("000011:Mod.esp", &[(Some("000010:Mod.esp"), 1), (Some("000002:Mod.esp"), 1)]),
        ]);

        let (hits, _, stats) = run(&store, &["000010:Mod.esp"]);
        assert_eq!(hits[&key("000001:Mod.esp")], 1);
        assert_eq!(hits[&key("000002:Mod.esp")], 1);
        assert_eq!(stats.lists_visited, 2);
    }

    #[test]
    fn test_visited_set_is_per_root() {
        // L2 references L1; both are roots, so L1 expands once per root
        let store = order(vec![
            item("000801:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000801:Mod.esp"), 1)]),
            list("000011:Mod.esp", &[(Some("000010:Mod.esp"), 1)]),
        ]);

        let (forward, log_a, _) = run(&store, &["000011:Mod.esp", "000010:Mod.esp"]);
        let (backward, log_b, _) = run(&store, &["000010:Mod.esp", "000011:Mod.esp"]);

        assert_eq!(forward[&key("000801:Mod.esp")], 2);
        assert_eq!(forward, backward);
        assert!(log_a.is_empty());
        assert!(log_b.is_empty());
    }

    #[test]
    fn test_null_entry_skipped_and_logged() {
        let store = order(vec![
            item("000001:Mod.esp"),
            list("000010:Mod.esp", &[(None, 1), (Some("000001:Mod.esp"), 1)]),
        ]);

        let (hits, log, _) = run(&store, &["000010:Mod.esp"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(log.count(|a| matches!(a, Anomaly::NullLootEntry { .. })), 1);
    }

    #[test]
    fn test_zero_count_logged_but_still_visited() {
        let store = order(vec![
            item("000001:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000001:Mod.esp"), 0)]),
        ]);

        let (hits, log, _) = run(&store, &["000010:Mod.esp"]);
        assert_eq!(hits[&key("000001:Mod.esp")], 1);
        assert_eq!(
            log.count(|a| matches!(a, Anomaly::NonPositiveCount { count: 0, .. })),
            1
        );
    }

    #[test]
    fn test_unresolved_entry_skipped_and_logged() {
        let store = order(vec![list("000010:Mod.esp", &[(Some("000099:Mod.esp"), 1)])]);

        let (hits, log, _) = run(&store, &["000010:Mod.esp"]);
        assert!(hits.is_empty());
        assert_eq!(
            log.count(|a| matches!(a, Anomaly::UnresolvedLootEntry { .. })),
            1
        );
    }

    #[test]
    fn test_mark_all_uses_every_winning_list() {
        let store = order(vec![
            item("000001:Mod.esp"),
            item("000002:Mod.esp"),
            list("000010:Mod.esp", &[(Some("000001:Mod.esp"), 1)]),
            list("000011:Mod.esp", &[(Some("000002:Mod.esp"), 1)]),
        ]);

        let mut log = AnomalyLog::new();
        let mut seen = HashSet::new();
        let stats = LootWalker::new(&store)
            .mark_all(&mut log, |item, _| {
                seen.insert(item.key.clone());
            })
            .unwrap();

        assert_eq!(stats.roots, 2);
        assert_eq!(seen.len(), 2);
    }
}
