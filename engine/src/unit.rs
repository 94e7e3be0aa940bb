use std::fmt;

use serde::{Deserialize, Serialize};

/// Rarity tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Normal,
    Magic,
    Rare,
    Epic,
    Unique,
    Legend,
    Eternal,
    Beyond,
}

impl Grade {
    pub const ALL: [Grade; 8] = [
        Grade::Normal,
        Grade::Magic,
        Grade::Rare,
        Grade::Epic,
        Grade::Unique,
        Grade::Legend,
        Grade::Eternal,
        Grade::Beyond,
    ];

    /// In-game label.
    pub fn label(self) -> &'static str {
        match self {
            Grade::Normal => "노멀",
            Grade::Magic => "매직",
            Grade::Rare => "레어",
            Grade::Epic => "에픽",
            Grade::Unique => "유니크",
            Grade::Legend => "레전드",
            Grade::Eternal => "이터널",
            Grade::Beyond => "비욘드",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out instance ids. Id 0 is reserved for catalog templates.
#[derive(Debug, Clone)]
pub struct IdGen {
    next: u64,
}

impl Default for IdGen {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub id: UnitId,
    /// Also the ingredient key recipes match on.
    pub name: String,
    pub grade: Grade,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub def: i32,
    pub range: f64,
    pub speed: f64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

fn default_level() -> u32 {
    1
}

impl Unit {
    /// Copy of this unit under a fresh identity.
    pub fn instantiate(&self, ids: &mut IdGen) -> Unit {
        Unit { id: ids.next_id(), ..self.clone() }
    }

    /// Damage dealt by `self` hitting `target`; never below 1.
    pub fn damage_against(&self, target: &Unit) -> i32 {
        (self.atk - target.def).max(1)
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.id)
    }
}
