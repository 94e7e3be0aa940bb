use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::{BattleConfig, ProgressionConfig};
use crate::content::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::roulette::{fill_board, spin, SpinOutcome};
use crate::run::MAX_FLOORS;
use crate::skirmish::{enemy_wave, BattleOutcome, BattleUnit, Skirmish};
use crate::unit::{IdGen, Unit};
use crate::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Summon,
    Skirmish,
    Finished,
    Abandoned,
}

/// One battle, from board fill to outcome.
///
/// The host owns the session and drives it: `spin`, then `engage`, then
/// `step` at whatever cadence it likes (a 50 ms timer in game, a tight loop
/// in tests). Dropping or `abandon`ing the session is the cancellation path.
pub struct BattleSession {
    floor: u32,
    roulette_slots: u32,
    catalog: Catalog,
    config: BattleConfig,
    rng: GameRng,
    ids: IdGen,
    board: Vec<Unit>,
    enemies: Vec<Unit>,
    carry_over: Vec<Unit>,
    spin: Option<SpinOutcome>,
    skirmish: Option<Skirmish>,
    outcome: Option<BattleOutcome>,
    phase: Phase,
    log: Vec<String>,
}

/// Fill the board and roll the enemy wave for a new battle.
///
/// `board_size` and `roulette_slots` must lie within the default
/// progression bounds and `floor` within `1..=MAX_FLOORS`; anything else is
/// a precondition violation, as is an invalid `config`.
#[allow(clippy::too_many_arguments)]
pub fn start_battle(
    deck: &[Unit],
    board_size: u32,
    roulette_slots: u32,
    floor: u32,
    carry_over: &[Unit],
    catalog: &Catalog,
    config: BattleConfig,
    mut rng: GameRng,
) -> EngineResult<BattleSession> {
    ProgressionConfig::default().check_sizes(board_size, roulette_slots)?;
    if !(1..=MAX_FLOORS).contains(&floor) {
        return Err(EngineError::precondition(format!("floor {floor} outside 1..={MAX_FLOORS}")));
    }
    config.validate()?;

    let mut ids = IdGen::new();
    let board = fill_board(deck, board_size, &mut rng, &mut ids)?;
    let enemies = enemy_wave(floor, catalog, &config, &mut rng, &mut ids);
    info!(floor, board = board.len(), enemies = enemies.len(), "battle started");

    let log = vec![format!(
        "[BOARD] {}x{} from {} deck units; {} enemies on floor {}",
        board_size,
        board_size,
        deck.len(),
        enemies.len(),
        floor
    )];
    Ok(BattleSession {
        floor,
        roulette_slots,
        catalog: catalog.clone(),
        config,
        rng,
        ids,
        board,
        enemies,
        carry_over: carry_over.to_vec(),
        spin: None,
        skirmish: None,
        outcome: None,
        phase: Phase::Summon,
        log,
    })
}

impl BattleSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn board(&self) -> &[Unit] {
        &self.board
    }

    pub fn enemies(&self) -> &[Unit] {
        &self.enemies
    }

    pub fn spin_outcome(&self) -> Option<&SpinOutcome> {
        self.spin.as_ref()
    }

    /// Friendly roster once the roulette has spun.
    pub fn roster(&self) -> &[Unit] {
        self.spin.as_ref().map(|s| s.roster.as_slice()).unwrap_or(&[])
    }

    pub fn battle_units(&self) -> &[BattleUnit] {
        self.skirmish.as_ref().map(Skirmish::units).unwrap_or(&[])
    }

    pub fn ticks(&self) -> u64 {
        self.skirmish.as_ref().map(Skirmish::ticks).unwrap_or(0)
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    /// How long a UI should hold the reels before revealing the spin.
    pub fn spin_delay(&self) -> Duration {
        self.config.spin_delay()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Abandoned)
    }

    /// Session lines followed by the skirmish's own log.
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log
            .iter()
            .chain(self.skirmish.iter().flat_map(|s| s.log().iter()))
            .map(String::as_str)
    }

    /// Spin the roulette. Allowed once per battle, during the summon phase.
    pub fn spin(&mut self) -> EngineResult<&SpinOutcome> {
        if self.phase != Phase::Summon {
            return Err(EngineError::precondition(format!(
                "cannot spin during {:?} phase",
                self.phase
            )));
        }
        if self.spin.is_some() {
            return Err(EngineError::precondition("roulette already spun for this battle"));
        }

        let outcome = spin(
            &self.board,
            self.roulette_slots,
            &self.carry_over,
            &self.catalog,
            &mut self.rng,
            &mut self.ids,
        )?;
        let names: Vec<&str> = outcome.draw.iter().map(|u| u.name.as_str()).collect();
        self.log.push(format!("[SPIN] slots {:?} → {}", outcome.slots, names.join(", ")));
        for crafted in &outcome.crafted {
            self.log.push(format!("[CRAFT] {}", crafted.label()));
        }
        Ok(self.spin.insert(outcome))
    }

    /// Place the roster and the enemy wave on the field.
    pub fn engage(&mut self) -> EngineResult<()> {
        if self.phase != Phase::Summon {
            return Err(EngineError::precondition(format!(
                "cannot engage during {:?} phase",
                self.phase
            )));
        }
        let Some(spin) = self.spin.as_ref() else {
            return Err(EngineError::precondition("spin the roulette before engaging"));
        };
        let skirmish = Skirmish::new(&spin.roster, &self.enemies, self.floor, self.config.clone());
        self.skirmish = Some(skirmish);
        self.phase = Phase::Skirmish;
        info!(floor = self.floor, "skirmish engaged");
        Ok(())
    }

    /// One simulation tick. Yields the outcome exactly once; outside the
    /// skirmish phase this is a no-op.
    pub fn step(&mut self) -> Option<BattleOutcome> {
        if self.phase != Phase::Skirmish {
            return None;
        }
        let outcome = self.skirmish.as_mut()?.step()?;
        self.finish(outcome.clone());
        Some(outcome)
    }

    /// Consuming form of [`BattleSession::step`].
    pub fn tick(mut self) -> Self {
        self.step();
        self
    }

    /// Stop the battle. No outcome is emitted and no further ticks run.
    pub fn abandon(&mut self) {
        if !self.is_terminal() {
            info!(floor = self.floor, phase = ?self.phase, "battle abandoned");
            self.log.push("[ABANDON] battle abandoned".to_string());
            self.phase = Phase::Abandoned;
        }
    }

    /// Spin (if needed), engage (if needed) and tick until the skirmish ends.
    pub fn run_to_completion(&mut self) -> EngineResult<BattleOutcome> {
        match self.phase {
            Phase::Abandoned => return Err(EngineError::precondition("battle was abandoned")),
            Phase::Finished => {
                return self
                    .outcome
                    .clone()
                    .ok_or_else(|| EngineError::precondition("finished battle without an outcome"));
            }
            Phase::Summon => {
                if self.spin.is_none() {
                    self.spin()?;
                }
                self.engage()?;
            }
            Phase::Skirmish => {}
        }
        let skirmish = self
            .skirmish
            .as_mut()
            .ok_or_else(|| EngineError::precondition("skirmish phase without a field"))?;
        let outcome = skirmish.run_to_completion()?;
        self.finish(outcome.clone());
        Ok(outcome)
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        self.phase = Phase::Finished;
        self.outcome = Some(outcome);
    }
}
