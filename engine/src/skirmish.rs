use std::ops::{Add, Mul, Sub};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{BattleConfig, FieldLayout};
use crate::content::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::unit::{IdGen, Unit, UnitId};
use crate::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Vec2) -> f64 {
        (other - self).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Friendly,
    Enemy,
}

/// A unit on the field. Lives only for the duration of one skirmish.
#[derive(Debug, Clone, Serialize)]
pub struct BattleUnit {
    pub id: UnitId,
    pub unit: Unit,
    pub pos: Vec2,
    pub faction: Faction,
    pub current_hp: i32,
}

impl BattleUnit {
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkirmishState {
    Running,
    Victory,
    Defeat,
}

impl SkirmishState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SkirmishState::Running)
    }
}

/// Emitted once when a skirmish ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleOutcome {
    pub victory: bool,
    pub gold_earned: u32,
    /// Templates of the friendly units still standing; empty on defeat.
    pub survivors: Vec<Unit>,
    pub ticks: u64,
}

/// Roll `base_enemy_count + floor` enemies from the catalog's base units.
pub fn enemy_wave(
    floor: u32,
    catalog: &Catalog,
    config: &BattleConfig,
    rng: &mut GameRng,
    ids: &mut IdGen,
) -> Vec<Unit> {
    let templates = catalog.base_units();
    (0..config.enemy_count(floor))
        .filter_map(|_| rng.choose(templates))
        .map(|t| Unit { name: config.enemy_name.clone(), ..t.instantiate(ids) })
        .collect()
}

fn slot_position(layout: &FieldLayout, index: usize, faction: Faction) -> Vec2 {
    let row = (index / layout.row_length.max(1)) as f64;
    let x = layout.origin_x + (index as f64 * layout.column_step) % layout.wrap_width;
    let y = match faction {
        Faction::Friendly => layout.friendly_y + row * layout.row_step,
        Faction::Enemy => layout.enemy_y - row * layout.row_step,
    };
    Vec2::new(x, y)
}

/// Tick-driven positional combat between a friendly roster and an enemy wave.
#[derive(Debug, Clone)]
pub struct Skirmish {
    units: Vec<BattleUnit>,
    state: SkirmishState,
    floor: u32,
    ticks: u64,
    config: BattleConfig,
    outcome: Option<BattleOutcome>,
    emitted: bool,
    log: Vec<String>,
}

impl Skirmish {
    pub fn new(roster: &[Unit], enemies: &[Unit], floor: u32, config: BattleConfig) -> Self {
        let place = |(i, u): (usize, &Unit), faction: Faction| BattleUnit {
            id: u.id,
            unit: u.clone(),
            pos: slot_position(&config.layout, i, faction),
            faction,
            current_hp: u.hp,
        };
        let units: Vec<BattleUnit> = roster
            .iter()
            .enumerate()
            .map(|e| place(e, Faction::Friendly))
            .chain(enemies.iter().enumerate().map(|e| place(e, Faction::Enemy)))
            .collect();

        let mut skirmish = Self {
            units,
            state: SkirmishState::Running,
            floor,
            ticks: 0,
            config,
            outcome: None,
            emitted: false,
            log: Vec::new(),
        };
        skirmish.log.push(format!(
            "[START] floor {}: {} friendly vs {} enemy",
            floor,
            roster.len(),
            enemies.len()
        ));
        skirmish.check_terminal();
        skirmish
    }

    pub fn state(&self) -> SkirmishState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Living units, friendly side first in placement order.
    pub fn units(&self) -> &[BattleUnit] {
        &self.units
    }

    pub fn alive(&self, faction: Faction) -> usize {
        self.units
            .iter()
            .filter(|u| u.faction == faction && u.is_alive())
            .count()
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Advance one tick. Returns the outcome on the call that ends the skirmish
    /// and `None` on every other call; a finished skirmish never ticks again.
    pub fn step(&mut self) -> Option<BattleOutcome> {
        if self.is_terminal() {
            return self.emit();
        }
        self.ticks += 1;

        // Movement reads start-of-tick positions; damage lands immediately.
        let positions: Vec<Vec2> = self.units.iter().map(|u| u.pos).collect();
        for i in 0..self.units.len() {
            if !self.units[i].is_alive() {
                continue;
            }
            let faction = self.units[i].faction;
            // First living opponent in field order, not the geometrically nearest.
            let Some(j) = self
                .units
                .iter()
                .position(|t| t.faction != faction && t.is_alive())
            else {
                continue;
            };

            let delta = positions[j] - positions[i];
            let dist = delta.length();
            let reach = self.units[i].unit.range * self.config.range_scale;
            if dist < reach {
                self.strike(i, j);
            } else if dist > f64::EPSILON {
                // Never step past the target.
                let step = (self.units[i].unit.speed / self.config.move_divisor).min(dist);
                self.units[i].pos = positions[i] + delta * (step / dist);
            }
        }

        self.units.retain(BattleUnit::is_alive);
        self.check_terminal();
        if self.is_terminal() { self.emit() } else { None }
    }

    /// Consuming form of [`Skirmish::step`].
    pub fn tick(mut self) -> Self {
        self.step();
        self
    }

    /// Step until terminal, bounded by `max_ticks`. Fails once the outcome
    /// has already been handed out, by `step` or an earlier call.
    pub fn run_to_completion(&mut self) -> EngineResult<BattleOutcome> {
        if self.emitted {
            return Err(EngineError::precondition("skirmish outcome already emitted"));
        }
        while !self.is_terminal() {
            if self.ticks >= self.config.max_ticks {
                return Err(EngineError::TickLimit { ticks: self.ticks });
            }
            self.step();
        }
        self.emitted = true;
        self.outcome
            .clone()
            .ok_or_else(|| EngineError::precondition("terminal skirmish without an outcome"))
    }

    fn strike(&mut self, attacker: usize, target: usize) {
        let dmg = self.units[attacker].unit.damage_against(&self.units[target].unit);
        let who = self.units[attacker].unit.label();
        let victim = &mut self.units[target];
        let before = victim.current_hp;
        victim.current_hp -= dmg;
        debug!(tick = self.ticks, attacker = %who, target = %victim.unit.label(), dmg, "hit");
        self.log.push(format!(
            "[ATK][{}] → {} dmg={} hp {} → {}",
            who,
            victim.unit.label(),
            dmg,
            before,
            victim.current_hp
        ));
        if !victim.is_alive() {
            self.log.push(format!("[KILL][{}] falls on tick {}", victim.unit.label(), self.ticks));
        }
    }

    fn check_terminal(&mut self) {
        if self.is_terminal() {
            return;
        }
        let (victory, gold_earned, survivors) = if self.alive(Faction::Enemy) == 0 {
            let survivors: Vec<Unit> = self
                .units
                .iter()
                .filter(|u| u.faction == Faction::Friendly && u.is_alive())
                .map(|u| u.unit.clone())
                .collect();
            (true, self.config.victory_gold(self.floor), survivors)
        } else if self.alive(Faction::Friendly) == 0 {
            (false, 0, Vec::new())
        } else {
            return;
        };

        self.state = if victory { SkirmishState::Victory } else { SkirmishState::Defeat };
        self.log.push(format!(
            "[END] {} after {} ticks gold={} survivors={}",
            if victory { "victory" } else { "defeat" },
            self.ticks,
            gold_earned,
            survivors.len()
        ));
        info!(floor = self.floor, ticks = self.ticks, victory, gold_earned, "skirmish finished");
        self.outcome = Some(BattleOutcome { victory, gold_earned, survivors, ticks: self.ticks });
    }

    fn emit(&mut self) -> Option<BattleOutcome> {
        if self.emitted {
            return None;
        }
        self.emitted = true;
        self.outcome.clone()
    }
}
