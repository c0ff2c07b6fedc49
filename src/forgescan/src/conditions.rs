//! Food recipe condition decoding
//!
//! Recipe conditions are rendered to text (`Function(param) op value AND`)
//! and then split into the declutter, skill level and generic condition
//! columns of the recipe report. Every string the decoder matches on lives
//! in this module.

use crate::record::{Comparison, Condition};
use crate::store::{RecordStore, StoreResult};

/// A condition starting with one of these drops the whole recipe
const DROP_MARKERS: [&str; 2] = [
    "GetGlobalValue(_Seed_CACO_Loaded) <> 2",
    "GetGlobalValue(CACO_CACOIsInstalled) = 0",
];

/// A last condition starting with this drops the whole recipe
const TRAILING_DROP_MARKER: &str = "GetGlobalValue(CACO_PlayerCookingXPEnabled) = 0";

/// Conditions removed outright (first exact match of each)
const BOILERPLATE: [&str; 5] = [
    "GetGlobalValue(CACO_CACOIsInstalled) = 1 AND",
    "GetGlobalValue(CACO_CACOAddedRecipes) = 1 AND",
    "GetGlobalValue(CACO_PlayerCookingXPEnabled) = 0 OR",
    "GetGlobalValue(_DS_Hunterborn__Active) = 1 AND",
    "GetGlobalValue(CACO_OptionDeclutterCookingMenu) = 0 OR",
];

const ITEM_COUNT_FUNCTION: &str = "GetItemCount";

const SKILL_LEVEL_MARKER: &str =
    "GetGlobalValue(CACO_PlayerCookingSkillLVL) >= CACO_FoodCookingSkill";

/// Render one condition as `Function(param) op value AND|OR`
///
/// The parameter renders as its display name for ingestibles and its editor
/// id otherwise; an unresolvable parameter renders empty.
pub fn render(store: &dyn RecordStore, condition: &Condition) -> StoreResult<String> {
    let param = match &condition.parameter {
        Some(key) => store
            .resolve(key)?
            .and_then(|record| match record.as_ingestible() {
                Some(food) => food.item.name.clone(),
                None => record.editor_id.clone(),
            })
            .unwrap_or_default(),
        None => String::new(),
    };

    let value = match &condition.comparison {
        Comparison::Value(v) => v.to_string(),
        Comparison::Global(key) => store
            .resolve(key)?
            .map(|global| global.label())
            .unwrap_or_else(|| key.to_string()),
    };

    let combinator = if condition.or { "OR" } else { "AND" };

    Ok(format!(
        "{}({}) {} {} {}",
        condition.function,
        param,
        condition.operator.symbol(),
        value,
        combinator
    ))
}

/// Three-way split of a recipe's conditions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedConditions {
    /// Item-count run with the function wrapper removed, space separated
    pub declutter: String,
    /// Threshold of the minimum cooking skill condition
    pub skill_level: String,
    /// Everything else, in original order
    pub generic: Vec<String>,
}

/// Decode rendered conditions; `None` means the recipe is dropped
pub fn decode(mut conditions: Vec<String>) -> Option<DecodedConditions> {
    let gated = conditions
        .iter()
        .any(|c| DROP_MARKERS.iter().any(|marker| c.starts_with(marker)));
    let toggled_off = conditions
        .last()
        .is_some_and(|c| c.starts_with(TRAILING_DROP_MARKER));
    if gated || toggled_off {
        return None;
    }

    for boilerplate in BOILERPLATE {
        if let Some(pos) = conditions.iter().position(|c| c == boilerplate) {
            conditions.remove(pos);
        }
    }

    let declutter = take_declutter(&mut conditions);
    let skill_level = take_skill_level(&mut conditions);

    Some(DecodedConditions {
        declutter,
        skill_level,
        generic: conditions,
    })
}

/// Remove the run of item-count conditions starting at the first one
///
/// The run continues through OR-combined conditions and ends after the first
/// AND-combined one or when the list runs out.
fn take_declutter(conditions: &mut Vec<String>) -> String {
    let Some(start) = conditions
        .iter()
        .position(|c| c.starts_with(ITEM_COUNT_FUNCTION))
    else {
        return String::new();
    };

    let wrapper = format!("{}(", ITEM_COUNT_FUNCTION);
    let mut parts = Vec::new();

    while start < conditions.len() {
        let condition = conditions.remove(start);
        parts.push(condition.replace(&wrapper, "").replace(')', ""));
        if condition.ends_with("AND") {
            break;
        }
    }

    parts.join(" ")
}

/// Remove the skill level condition and return its threshold
///
/// A trailing ` OR` is stripped only when the condition is the last one left.
fn take_skill_level(conditions: &mut Vec<String>) -> String {
    let Some(pos) = conditions
        .iter()
        .position(|c| c.starts_with(SKILL_LEVEL_MARKER))
    else {
        return String::new();
    };

    let mut skill = conditions.remove(pos);
    if pos == conditions.len() {
        skill = skill.replace(" OR", "");
    }
    skill.replace(SKILL_LEVEL_MARKER, "").replace(" AND", "")
}
