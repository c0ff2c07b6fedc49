//! Record model for a resolved load order
//!
//! Records are plain data. Identity is a [`FormKey`]: the plugin that first
//! introduced the record plus its local id within that plugin, so every
//! override of a record shares one key no matter which plugin last touched it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Largest local id a plugin can assign (24 bits)
pub const MAX_LOCAL_ID: u32 = 0x00FF_FFFF;

/// File name of a source plugin (e.g. `Skyrim.esm`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModKey(String);

impl ModKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Stable identity of a record across the whole load order
///
/// Text form is `XXXXXX:Plugin.esp`, six upper-case hex digits for the local
/// id followed by the origin plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    origin: ModKey,
    local: u32,
}

impl FormKey {
    /// Build a key, rejecting local ids wider than 24 bits
    pub fn new(origin: impl Into<ModKey>, local: u32) -> Result<Self, StoreError> {
        let origin = origin.into();
        if local > MAX_LOCAL_ID || origin.as_str().is_empty() {
            return Err(StoreError::InvalidFormKey(format!("{:06X}:{}", local, origin)));
        }
        Ok(Self { origin, local })
    }

    /// Plugin that introduced the record
    pub fn origin(&self) -> &ModKey {
        &self.origin
    }

    pub fn local(&self) -> u32 {
        self.local
    }

    /// Local id as the `0x`-prefixed hex shown in reports
    pub fn id_hex(&self) -> String {
        format!("0x{:06X}", self.local)
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.local, self.origin)
    }
}

impl FromStr for FormKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidFormKey(s.to_string());

        let (id, plugin) = s.split_once(':').ok_or_else(invalid)?;
        if id.is_empty() || plugin.is_empty() {
            return Err(invalid());
        }

        let id = id.strip_prefix("0x").unwrap_or(id);
        let local = u32::from_str_radix(id, 16).map_err(|_| invalid())?;
        Self::new(ModKey::new(plugin), local).map_err(|_| invalid())
    }
}

impl TryFrom<String> for FormKey {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(key: FormKey) -> Self {
        key.to_string()
    }
}

/// Discriminant of [`RecordBody`], used to enumerate one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Armor,
    Weapon,
    Ingestible,
    Ingredient,
    MiscItem,
    Keyword,
    MagicEffect,
    ObjectEffect,
    Global,
    LeveledItem,
    ConstructibleObject,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Armor => "armor",
            RecordKind::Weapon => "weapon",
            RecordKind::Ingestible => "ingestible",
            RecordKind::Ingredient => "ingredient",
            RecordKind::MiscItem => "misc item",
            RecordKind::Keyword => "keyword",
            RecordKind::MagicEffect => "magic effect",
            RecordKind::ObjectEffect => "object effect",
            RecordKind::Global => "global",
            RecordKind::LeveledItem => "leveled item",
            RecordKind::ConstructibleObject => "constructible object",
        };
        f.write_str(name)
    }
}

/// A single winning (or overridden) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: FormKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(flatten)]
    pub body: RecordBody,
}

/// Type-specific record payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordBody {
    Armor(Armor),
    Weapon(Weapon),
    Ingestible(Ingestible),
    Ingredient(Ingredient),
    MiscItem(MiscItem),
    Keyword,
    MagicEffect(MagicEffect),
    ObjectEffect,
    Global,
    LeveledItem(LeveledItem),
    ConstructibleObject(ConstructibleObject),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match &self.body {
            RecordBody::Armor(_) => RecordKind::Armor,
            RecordBody::Weapon(_) => RecordKind::Weapon,
            RecordBody::Ingestible(_) => RecordKind::Ingestible,
            RecordBody::Ingredient(_) => RecordKind::Ingredient,
            RecordBody::MiscItem(_) => RecordKind::MiscItem,
            RecordBody::Keyword => RecordKind::Keyword,
            RecordBody::MagicEffect(_) => RecordKind::MagicEffect,
            RecordBody::ObjectEffect => RecordKind::ObjectEffect,
            RecordBody::Global => RecordKind::Global,
            RecordBody::LeveledItem(_) => RecordKind::LeveledItem,
            RecordBody::ConstructibleObject(_) => RecordKind::ConstructibleObject,
        }
    }

    /// Shared item fields, for the kinds that represent inventory items
    pub fn item(&self) -> Option<&ItemData> {
        match &self.body {
            RecordBody::Armor(a) => Some(&a.item),
            RecordBody::Weapon(w) => Some(&w.item),
            RecordBody::Ingestible(i) => Some(&i.item),
            RecordBody::Ingredient(i) => Some(&i.item),
            RecordBody::MiscItem(m) => Some(&m.item),
            _ => None,
        }
    }

    pub fn as_armor(&self) -> Option<&Armor> {
        match &self.body {
            RecordBody::Armor(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match &self.body {
            RecordBody::Weapon(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_ingestible(&self) -> Option<&Ingestible> {
        match &self.body {
            RecordBody::Ingestible(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_ingredient(&self) -> Option<&Ingredient> {
        match &self.body {
            RecordBody::Ingredient(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_leveled_item(&self) -> Option<&LeveledItem> {
        match &self.body {
            RecordBody::LeveledItem(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_recipe(&self) -> Option<&ConstructibleObject> {
        match &self.body {
            RecordBody::ConstructibleObject(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_magic_effect(&self) -> Option<&MagicEffect> {
        match &self.body {
            RecordBody::MagicEffect(m) => Some(m),
            _ => None,
        }
    }

    /// Display name for items and magic effects
    pub fn name(&self) -> Option<&str> {
        match &self.body {
            RecordBody::MagicEffect(m) => m.name.as_deref(),
            _ => self.item().and_then(|i| i.name.as_deref()),
        }
    }

    /// Editor id, or the form key when the record has none
    pub fn label(&self) -> String {
        self.editor_id
            .clone()
            .unwrap_or_else(|| self.key.to_string())
    }
}

/// Fields every inventory item carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<FormKey>,
    /// Record-level flag hiding the item from players
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub non_playable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    #[serde(flatten)]
    pub item: ItemData,
    #[serde(default)]
    pub armor_rating: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<FormKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_effect: Option<FormKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_template: Option<BodyTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_type: Option<String>,
    /// Biped slot bitmask
    #[serde(default)]
    pub first_person_flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(flatten)]
    pub item: ItemData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<FormKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default)]
    pub damage: u16,
    #[serde(default)]
    pub reach: f32,
    #[serde(default)]
    pub speed: f32,
    #[serde(default)]
    pub crit_damage: u16,
    #[serde(default)]
    pub crit_mult: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingestible {
    #[serde(flatten)]
    pub item: ItemData,
    /// Set for food; unset for potions and poisons
    #[serde(default)]
    pub food: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(flatten)]
    pub item: ItemData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiscItem {
    #[serde(flatten)]
    pub item: ItemData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MagicEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub base_effect: FormKey,
    #[serde(default)]
    pub magnitude: f32,
    #[serde(default)]
    pub duration: u32,
}

/// Randomized loot list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeveledItem {
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item or nested loot list; `None` marks a null entry
    #[serde(default)]
    pub reference: Option<FormKey>,
    #[serde(default = "default_count")]
    pub count: i32,
}

fn default_count() -> i32 {
    1
}

/// Crafting recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructibleObject {
    #[serde(default)]
    pub created_object: Option<FormKey>,
    #[serde(default = "default_created_count")]
    pub created_count: u16,
    /// Crafting-station keyword
    #[serde(default)]
    pub workbench: Option<FormKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RecipeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

fn default_created_count() -> u16 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub item: FormKey,
    #[serde(default = "default_count")]
    pub count: i32,
}

/// One predicate gating when a recipe is offered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<FormKey>,
    pub operator: CompareOperator,
    pub comparison: Comparison,
    /// Combine with the next condition using OR instead of AND
    #[serde(default)]
    pub or: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOperator {
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

impl CompareOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOperator::EqualTo => "=",
            CompareOperator::NotEqualTo => "<>",
            CompareOperator::GreaterThan => ">",
            CompareOperator::GreaterThanOrEqualTo => ">=",
            CompareOperator::LessThan => "<",
            CompareOperator::LessThanOrEqualTo => "<=",
        }
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Value(f32),
    Global(FormKey),
}
