use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ProgressionConfig;
use crate::error::{EngineError, EngineResult, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Board,
    Roulette,
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeKind::Board => f.write_str("board"),
            UpgradeKind::Roulette => f.write_str("roulette"),
        }
    }
}

/// Purchases needed to grow a capacity currently at `level`.
pub fn upgrade_requirement(level: u32) -> u32 {
    level * 2 + 1
}

/// One capped capacity and the purchases made toward its next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub capacity: u32,
    pub progress: u32,
}

impl Track {
    pub fn new(capacity: u32) -> Self {
        Self { capacity, progress: 0 }
    }

    pub fn requirement(&self) -> u32 {
        upgrade_requirement(self.capacity)
    }
}

/// Gold plus the board and roulette tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub gold: u32,
    pub board: Track,
    pub roulette: Track,
}

impl Ledger {
    pub fn new(gold: u32, cfg: &ProgressionConfig) -> Self {
        Self {
            gold,
            board: Track::new(cfg.min_board_size),
            roulette: Track::new(cfg.min_roulette_slots),
        }
    }

    pub fn track(&self, kind: UpgradeKind) -> Track {
        match kind {
            UpgradeKind::Board => self.board,
            UpgradeKind::Roulette => self.roulette,
        }
    }

    fn track_mut(&mut self, kind: UpgradeKind) -> &mut Track {
        match kind {
            UpgradeKind::Board => &mut self.board,
            UpgradeKind::Roulette => &mut self.roulette,
        }
    }

    pub fn board_size(&self) -> u32 {
        self.board.capacity
    }

    pub fn roulette_slots(&self) -> u32 {
        self.roulette.capacity
    }

    pub fn upgrade_board(&self, cfg: &ProgressionConfig) -> EngineResult<Ledger> {
        attempt_upgrade(UpgradeKind::Board, self, cfg)
    }

    pub fn upgrade_roulette(&self, cfg: &ProgressionConfig) -> EngineResult<Ledger> {
        attempt_upgrade(UpgradeKind::Roulette, self, cfg)
    }
}

/// Buy one step of progress on `kind`.
///
/// Rejections leave `ledger` untouched. A successful purchase always costs
/// `upgrade_cost`; the capacity grows only when progress reaches the
/// requirement for the current level, after which progress restarts at 0.
pub fn attempt_upgrade(kind: UpgradeKind, ledger: &Ledger, cfg: &ProgressionConfig) -> EngineResult<Ledger> {
    let track = ledger.track(kind);
    if ledger.gold < cfg.upgrade_cost {
        warn!(%kind, gold = ledger.gold, cost = cfg.upgrade_cost, "upgrade rejected");
        return Err(EngineError::InsufficientResource {
            resource: Resource::Gold,
            needed: cfg.upgrade_cost,
            available: ledger.gold,
        });
    }
    if track.capacity >= cfg.max_capacity {
        warn!(%kind, capacity = track.capacity, "upgrade rejected");
        return Err(EngineError::InvalidUpgrade { kind, capacity: track.capacity });
    }

    let mut next = *ledger;
    next.gold -= cfg.upgrade_cost;
    let t = next.track_mut(kind);
    t.progress += 1;
    if t.progress >= upgrade_requirement(t.capacity) {
        t.capacity += 1;
        t.progress = 0;
        info!(%kind, capacity = t.capacity, "capacity increased");
    }
    Ok(next)
}
