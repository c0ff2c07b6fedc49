//! Recoverable data-quality issues
//!
//! Anomalies never abort a run. Each one is logged once as a warning when
//! recorded and kept for the run summary.

use std::fmt;

use crate::record::FormKey;
use crate::scanner::Category;

/// How an item reached a scanner after indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Loot,
    Recipe,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Loot => write!(f, "loot"),
            Signal::Recipe => write!(f, "recipe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// The store yielded one key twice while indexing a category
    DuplicateKey { category: Category, key: FormKey },
    /// An item surfaced through loot or a recipe but was never indexed
    NotIndexed {
        category: Category,
        key: FormKey,
        via: Signal,
    },
    /// Loot list entry with no reference
    NullLootEntry { list: FormKey },
    /// Loot list entry with a zero or negative count
    NonPositiveCount {
        list: FormKey,
        item: FormKey,
        count: i32,
    },
    /// Loot list entry pointing at a record that does not exist
    UnresolvedLootEntry { list: FormKey, reference: FormKey },
    /// Recipe without a crafting-station keyword
    MissingStation { recipe: FormKey },
    /// Recipe whose station keyword cannot be resolved or has no editor id
    UnresolvedStation { recipe: FormKey, station: FormKey },
    /// Recipe without an output, or with an output that cannot be resolved
    UnresolvedOutput {
        recipe: FormKey,
        output: Option<FormKey>,
    },
    /// A reference needed for one report row could not be resolved; the row is dropped
    UnresolvedReference {
        category: Category,
        item: FormKey,
        reference: FormKey,
    },
    /// Recipe ingredient that is not an ingestible, ingredient or misc item
    UnknownIngredientKind { recipe: FormKey, ingredient: FormKey },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::DuplicateKey { category, key } => {
                write!(f, "{} index: {} enumerated twice, keeping the first", category, key)
            }
            Anomaly::NotIndexed { category, key, via } => write!(
                f,
                "{} {} found via {} but not in initial index",
                category, key, via
            ),
            Anomaly::NullLootEntry { list } => write!(f, "loot list {} has null entries", list),
            Anomaly::NonPositiveCount { list, item, count } => {
                write!(f, "{} on loot list {} has count {}", item, list, count)
            }
            Anomaly::UnresolvedLootEntry { list, reference } => {
                write!(f, "loot list {} references missing record {}", list, reference)
            }
            Anomaly::MissingStation { recipe } => {
                write!(f, "recipe {} has no crafting station", recipe)
            }
            Anomaly::UnresolvedStation { recipe, station } => write!(
                f,
                "recipe {} uses unresolvable crafting station {}",
                recipe, station
            ),
            Anomaly::UnresolvedOutput { recipe, output } => match output {
                Some(output) => write!(f, "recipe {} creates missing record {}", recipe, output),
                None => write!(f, "recipe {} creates nothing", recipe),
            },
            Anomaly::UnresolvedReference {
                category,
                item,
                reference,
            } => write!(
                f,
                "could not resolve {} for {} {}; row skipped",
                reference, category, item
            ),
            Anomaly::UnknownIngredientKind { recipe, ingredient } => write!(
                f,
                "recipe {} uses ingredient {} of unknown type",
                recipe, ingredient
            ),
        }
    }
}

/// Anomalies recorded during one run, in the order they occurred
#[derive(Debug, Default)]
pub struct AnomalyLog {
    entries: Vec<Anomaly>,
}

impl AnomalyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, anomaly: Anomaly) {
        tracing::warn!("{}", anomaly);
        self.entries.push(anomaly);
    }

    pub fn entries(&self) -> &[Anomaly] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries matching a predicate
    pub fn count(&self, pred: impl Fn(&Anomaly) -> bool) -> usize {
        self.entries.iter().filter(|a| pred(a)).count()
    }
}
