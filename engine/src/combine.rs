use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::Catalog;
use crate::unit::{IdGen, Unit};

/// Multiset of ingredient names that crafts one `result` unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub ingredients: Vec<String>,
    pub result: String,
}

impl Recipe {
    pub fn new<S: Into<String>>(ingredients: impl IntoIterator<Item = S>, result: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            result: result.into(),
        }
    }

    /// Required count per distinct ingredient, in first-seen order.
    pub fn requirements(&self) -> IndexMap<&str, usize> {
        name_counts(self.ingredients.iter().map(String::as_str))
    }

    /// True when `counts` covers every ingredient with its multiplicity.
    pub fn is_satisfied_by(&self, counts: &IndexMap<&str, usize>) -> bool {
        self.requirements()
            .iter()
            .all(|(name, need)| counts.get(name).copied().unwrap_or(0) >= *need)
    }
}

pub fn name_counts<'a>(names: impl IntoIterator<Item = &'a str>) -> IndexMap<&'a str, usize> {
    let mut counts = IndexMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// Recipes satisfied by `draw`.
///
/// Each recipe is checked against the full draw counts; nothing is consumed,
/// so two recipes may both fire off the same units.
pub fn satisfied<'r>(draw: &[Unit], recipes: &'r [Recipe]) -> Vec<&'r Recipe> {
    let counts = name_counts(draw.iter().map(|u| u.name.as_str()));
    recipes.iter().filter(|r| r.is_satisfied_by(&counts)).collect()
}

/// Crafted units for `draw`, one fresh instance per satisfied recipe.
/// The draw itself is not part of the output.
pub fn resolve(draw: &[Unit], catalog: &Catalog, ids: &mut IdGen) -> Vec<Unit> {
    satisfied(draw, catalog.recipes())
        .into_iter()
        .filter_map(|recipe| {
            let crafted = catalog.template(&recipe.result)?.instantiate(ids);
            debug!(result = %recipe.result, id = %crafted.id, "recipe satisfied");
            Some(crafted)
        })
        .collect()
}
