use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BattleConfig, ProgressionConfig};
use crate::content::Catalog;
use crate::error::{EngineError, EngineResult, Resource};
use crate::ledger::{attempt_upgrade, Ledger, UpgradeKind};
use crate::session::{start_battle, BattleSession};
use crate::skirmish::BattleOutcome;
use crate::unit::{IdGen, Unit, UnitId};
use crate::GameRng;

pub const MAX_FLOORS: u32 = 25;
pub const STARTING_GOLD: u32 = 500;
pub const MIN_DECK_SIZE: usize = 3;
pub const MAX_STARTING_DECK: usize = 5;

const ESSENCE_PER_BATTLE: u32 = 10;
const ESSENCE_PER_BOSS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Battle,
    Elite,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Lost,
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopOffer {
    pub unit: Unit,
    pub price: u32,
}

/// What the run controller keeps between battles.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub ledger: Ledger,
    pub essence: u32,
    pub deck: Vec<Unit>,
    pub floor: u32,
    pub carry_over: Vec<Unit>,
    pub status: RunStatus,
    #[serde(skip)]
    ids: IdGen,
}

impl RunState {
    /// Start a run at floor 1 with a hand-picked deck of 3 to 5 units.
    pub fn new(deck: &[Unit], progression: &ProgressionConfig) -> EngineResult<Self> {
        if !(MIN_DECK_SIZE..=MAX_STARTING_DECK).contains(&deck.len()) {
            return Err(EngineError::precondition(format!(
                "starting deck needs {MIN_DECK_SIZE} to {MAX_STARTING_DECK} units, got {}",
                deck.len()
            )));
        }
        let mut ids = IdGen::new();
        let deck = deck.iter().map(|u| u.instantiate(&mut ids)).collect();
        Ok(Self {
            ledger: Ledger::new(STARTING_GOLD, progression),
            essence: 0,
            deck,
            floor: 1,
            carry_over: Vec::new(),
            status: RunStatus::InProgress,
            ids,
        })
    }

    pub fn gold(&self) -> u32 {
        self.ledger.gold
    }

    /// Begin the battle for the current floor from this run's deck and ledger.
    pub fn start_battle(&self, catalog: &Catalog, config: BattleConfig, rng: GameRng) -> EngineResult<BattleSession> {
        if self.status != RunStatus::InProgress {
            return Err(EngineError::precondition(format!("run is {:?}", self.status)));
        }
        start_battle(
            &self.deck,
            self.ledger.board_size(),
            self.ledger.roulette_slots(),
            self.floor,
            &self.carry_over,
            catalog,
            config,
            rng,
        )
    }

    /// Fold a finished battle back into the run.
    pub fn apply_battle_outcome(&mut self, node: NodeKind, outcome: &BattleOutcome) {
        if !outcome.victory {
            info!(floor = self.floor, "run lost");
            self.carry_over.clear();
            self.status = RunStatus::Lost;
            return;
        }
        self.ledger.gold += outcome.gold_earned;
        self.essence += match node {
            NodeKind::Boss => ESSENCE_PER_BOSS,
            NodeKind::Battle | NodeKind::Elite => ESSENCE_PER_BATTLE,
        };
        self.carry_over = outcome.survivors.clone();
        if node == NodeKind::Boss || self.floor >= MAX_FLOORS {
            self.status = RunStatus::Cleared;
        }
        self.floor = (self.floor + 1).min(MAX_FLOORS);
        info!(
            floor = self.floor,
            gold = self.ledger.gold,
            survivors = self.carry_over.len(),
            "battle won"
        );
    }

    /// Add a post-battle reward unit to the deck.
    pub fn claim_reward(&mut self, unit: &Unit) -> UnitId {
        let unit = unit.instantiate(&mut self.ids);
        let id = unit.id;
        self.deck.push(unit);
        id
    }

    pub fn buy_unit(&mut self, offer: &ShopOffer) -> EngineResult<UnitId> {
        if self.ledger.gold < offer.price {
            warn!(unit = %offer.unit.name, price = offer.price, gold = self.ledger.gold, "purchase rejected");
            return Err(EngineError::InsufficientResource {
                resource: Resource::Gold,
                needed: offer.price,
                available: self.ledger.gold,
            });
        }
        self.ledger.gold -= offer.price;
        Ok(self.claim_reward(&offer.unit))
    }

    /// Remove a unit from the deck, keeping at least [`MIN_DECK_SIZE`].
    pub fn dismiss_unit(&mut self, id: UnitId) -> EngineResult<Unit> {
        if self.deck.len() <= MIN_DECK_SIZE {
            return Err(EngineError::precondition(format!(
                "deck needs at least {MIN_DECK_SIZE} units"
            )));
        }
        let idx = self
            .deck
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| EngineError::precondition(format!("no deck unit {id}")))?;
        Ok(self.deck.remove(idx))
    }

    pub fn upgrade(&mut self, kind: UpgradeKind, cfg: &ProgressionConfig) -> EngineResult<()> {
        self.ledger = attempt_upgrade(kind, &self.ledger, cfg)?;
        Ok(())
    }
}
