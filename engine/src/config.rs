use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

pub const DEFAULT_BATTLE_YAML: &str = include_str!("../content/battle.yaml");

/// Where units stand when a skirmish begins.
///
/// Slot `i` sits at `x = origin_x + (i * column_step) % wrap_width` and moves
/// one row (`row_step`) away from the centre line every `row_length` slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLayout {
    pub origin_x: f64,
    pub column_step: f64,
    pub wrap_width: f64,
    pub row_length: usize,
    pub row_step: f64,
    pub friendly_y: f64,
    pub enemy_y: f64,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            origin_x: 50.0,
            column_step: 40.0,
            wrap_width: 700.0,
            row_length: 10,
            row_step: 40.0,
            friendly_y: 500.0,
            enemy_y: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Host cadence for `step()`; the simulation itself is tick-count based.
    pub tick_interval_ms: u64,
    /// Presentation-only pause before a spin result is revealed.
    pub spin_delay_ms: u64,
    /// Units advance `speed / move_divisor` per tick.
    pub move_divisor: f64,
    /// Attack when distance < `range * range_scale`.
    pub range_scale: f64,
    pub base_enemy_count: u32,
    pub enemy_name: String,
    pub gold_per_floor: u32,
    pub max_ticks: u64,
    pub layout: FieldLayout,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            spin_delay_ms: 1500,
            move_divisor: 20.0,
            range_scale: 1.0,
            base_enemy_count: 3,
            enemy_name: "타락한 천사".to_string(),
            gold_per_floor: 100,
            max_ticks: 20_000,
            layout: FieldLayout::default(),
        }
    }
}

impl BattleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }

    pub fn enemy_count(&self, floor: u32) -> usize {
        self.base_enemy_count.saturating_add(floor) as usize
    }

    pub fn victory_gold(&self, floor: u32) -> u32 {
        floor.saturating_mul(self.gold_per_floor)
    }

    /// Reject tunings under which a skirmish between two non-empty sides
    /// could stall: nobody in reach, nobody moving, or NaN positions.
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("move_divisor", self.move_divisor),
            ("range_scale", self.range_scale),
            ("layout.wrap_width", self.layout.wrap_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let placement = [
            ("layout.origin_x", self.layout.origin_x),
            ("layout.column_step", self.layout.column_step),
            ("layout.row_step", self.layout.row_step),
            ("layout.friendly_y", self.layout.friendly_y),
            ("layout.enemy_y", self.layout.enemy_y),
        ];
        if let Some((name, value)) = placement.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::Config(format!("{name} must be finite, got {value}")));
        }
        if self.layout.column_step < 0.0 {
            return Err(EngineError::Config("layout.column_step must not be negative".into()));
        }
        if self.max_ticks == 0 {
            return Err(EngineError::Config("max_ticks must be at least 1".into()));
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).context("failed to parse battle config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text).context("failed to parse battle config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json` file, or YAML for anything else.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read battle config: {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.with_context(|| format!("in {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub upgrade_cost: u32,
    pub max_capacity: u32,
    pub min_board_size: u32,
    pub min_roulette_slots: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            upgrade_cost: 500,
            max_capacity: 5,
            min_board_size: 2,
            min_roulette_slots: 3,
        }
    }
}

impl ProgressionConfig {
    /// Board edge and slot count must each sit between their minimum and
    /// `max_capacity`.
    pub fn check_sizes(&self, board_size: u32, roulette_slots: u32) -> EngineResult<()> {
        if !(self.min_board_size..=self.max_capacity).contains(&board_size) {
            return Err(EngineError::precondition(format!(
                "board size {board_size} outside {}..={}",
                self.min_board_size, self.max_capacity
            )));
        }
        if !(self.min_roulette_slots..=self.max_capacity).contains(&roulette_slots) {
            return Err(EngineError::precondition(format!(
                "roulette slots {roulette_slots} outside {}..={}",
                self.min_roulette_slots, self.max_capacity
            )));
        }
        Ok(())
    }
}
