use std::collections::HashSet;

use serde::Deserialize;

use crate::combine::Recipe;
use crate::error::{EngineError, EngineResult};
use crate::unit::Unit;

const BUILTIN_UNITS: &str = include_str!("../content/units.json");
const BUILTIN_RECIPES: &str = include_str!("../content/recipes.json");

#[derive(Debug, Deserialize)]
struct UnitFile {
    base: Vec<Unit>,
    #[serde(default)]
    special: Vec<Unit>,
}

/// Static unit templates and crafting recipes. Never mutated after load.
#[derive(Debug, Clone)]
pub struct Catalog {
    base: Vec<Unit>,
    special: Vec<Unit>,
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json(BUILTIN_UNITS, BUILTIN_RECIPES)
    }

    pub fn from_json(units: &str, recipes: &str) -> EngineResult<Self> {
        let file: UnitFile = serde_json::from_str(units)
            .map_err(|e| EngineError::Content(format!("units: {e}")))?;
        let recipes: Vec<Recipe> = serde_json::from_str(recipes)
            .map_err(|e| EngineError::Content(format!("recipes: {e}")))?;
        Self::new(file.base, file.special, recipes)
    }

    pub fn new(base: Vec<Unit>, special: Vec<Unit>, recipes: Vec<Recipe>) -> EngineResult<Self> {
        let catalog = Self { base, special, recipes };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.base.is_empty() {
            return Err(EngineError::Content("catalog has no base units".into()));
        }
        let mut seen = HashSet::new();
        for unit in self.base.iter().chain(&self.special) {
            if !seen.insert(unit.name.as_str()) {
                return Err(EngineError::Content(format!("duplicate unit '{}'", unit.name)));
            }
            if unit.range <= 0.0 || unit.speed < 0.0 {
                return Err(EngineError::Content(format!(
                    "unit '{}' needs positive range and non-negative speed",
                    unit.name
                )));
            }
            if unit.max_hp <= 0 || unit.hp > unit.max_hp {
                return Err(EngineError::Content(format!(
                    "unit '{}' has hp {} / max {}",
                    unit.name, unit.hp, unit.max_hp
                )));
            }
        }
        for recipe in &self.recipes {
            if recipe.ingredients.is_empty() {
                return Err(EngineError::Content(format!(
                    "recipe for '{}' has no ingredients",
                    recipe.result
                )));
            }
            if !seen.contains(recipe.result.as_str()) {
                return Err(EngineError::Content(format!(
                    "recipe result '{}' is not a known unit",
                    recipe.result
                )));
            }
            if let Some(missing) = recipe.ingredients.iter().find(|i| !seen.contains(i.as_str())) {
                return Err(EngineError::Content(format!(
                    "recipe for '{}' needs unknown unit '{}'",
                    recipe.result, missing
                )));
            }
        }
        Ok(())
    }

    /// Templates enemy waves are rolled from.
    pub fn base_units(&self) -> &[Unit] {
        &self.base
    }

    pub fn special_units(&self) -> &[Unit] {
        &self.special
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn special(&self, name: &str) -> Option<&Unit> {
        self.special.iter().find(|u| u.name == name)
    }

    /// Any template by name, base units first.
    pub fn template(&self, name: &str) -> Option<&Unit> {
        self.base
            .iter()
            .find(|u| u.name == name)
            .or_else(|| self.special(name))
    }

    /// Resolve a list of names into templates, failing on the first unknown one.
    pub fn templates_for<S: AsRef<str>>(&self, names: &[S]) -> EngineResult<Vec<Unit>> {
        names
            .iter()
            .map(|n| {
                self.template(n.as_ref())
                    .cloned()
                    .ok_or_else(|| EngineError::Content(format!("unknown unit '{}'", n.as_ref())))
            })
            .collect()
    }
}
