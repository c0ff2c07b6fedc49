//! Loot and crafting cross-reference engine
//!
//! Reads a merged load order of overridable game records and reports, per
//! item category, which items can be looted from randomized loot lists and
//! which can be crafted or tempered at which stations.
//!
//! # Passes
//!
//! A run makes three passes over the load order, in this order:
//! - Indexing: each category scanner indexes the winning version of every
//!   record of its type by [`FormKey`].
//! - Loot: every loot list is walked depth first; every item reachable from it
//!   is marked lootable. Lists may reference each other in cycles.
//! - Recipes: every crafting recipe with a usable station marks its output
//!   craftable or temperable. Food additionally keeps the recipe itself.
//!
//! Reports are then built from the final per-item state and written as CSV.
//!
//! # Data
//!
//! The engine reads records through [`RecordStore`]. [`LoadOrder`] implements
//! it over JSON or YAML plugin dumps listed in a load-order file.

pub mod anomaly;
pub mod conditions;
mod error;
pub mod index;
pub mod loot;
pub mod orchestrator;
pub mod output;
pub mod recipe;
pub mod record;
pub mod report;
pub mod scanner;
pub mod store;

pub use anomaly::{Anomaly, AnomalyLog, Signal};
pub use conditions::DecodedConditions;
pub use error::{Error, Result, StoreError};
pub use index::{Aggregate, ItemFlags, ItemIndex};
pub use loot::{LootStats, LootWalker};
pub use orchestrator::{run, Orchestrator, ScanOutcome, ScanStats};
pub use output::{OutputLayout, REPORT_NAMES};
pub use recipe::{RecipeResolver, RecipeSignal, RecipeStats, StationRole};
pub use record::{FormKey, ModKey, Record, RecordBody, RecordKind};
pub use report::{Cell, Report};
pub use scanner::{default_scanners, Category, Scanner};
pub use store::{read_load_order, LoadOrder, Plugin, RecordStore, StoreResult};
