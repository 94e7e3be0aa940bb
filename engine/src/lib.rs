use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod combine;
pub mod config;
pub mod content;
pub mod error;
pub mod ledger;
pub mod roulette;
pub mod run;
pub mod session;
pub mod skirmish;
pub mod unit;

pub use combine::{resolve, Recipe};
pub use config::{BattleConfig, FieldLayout, ProgressionConfig};
pub use content::Catalog;
pub use error::{EngineError, Resource};
pub use ledger::{attempt_upgrade, upgrade_requirement, Ledger, Track, UpgradeKind};
pub use roulette::{fill_board, spin, SpinOutcome};
pub use run::{NodeKind, RunState, RunStatus, ShopOffer};
pub use session::{start_battle, BattleSession, Phase};
pub use skirmish::{BattleOutcome, BattleUnit, Faction, Skirmish, SkirmishState, Vec2};
pub use unit::{Grade, IdGen, Unit, UnitId};

enum Source {
    Seeded(ChaCha8Rng),
    Scripted { values: Vec<usize>, cursor: usize },
}

/// The single random source a battle draws from.
///
/// Board fill, enemy wave and roulette sampling all pull indices from here,
/// in that order, so one seed reproduces a whole battle.
pub struct GameRng {
    source: Source,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { source: Source::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Replays `values` in order (wrapping), each reduced modulo the pick range.
    pub fn from_scripted(values: Vec<usize>) -> Self {
        Self { source: Source::Scripted { values, cursor: 0 } }
    }

    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    pub fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        match &mut self.source {
            Source::Seeded(rng) => rng.gen_range(0..len),
            Source::Scripted { values, cursor } => {
                if values.is_empty() {
                    return 0;
                }
                let v = values[*cursor % values.len()];
                *cursor += 1;
                v % len
            }
        }
    }

    /// Uniform pick from a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.pick(items.len());
        items.get(idx)
    }
}
