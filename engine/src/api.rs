use std::fs;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::session::start_battle;
use crate::unit::Unit;
use crate::GameRng;

const DEFAULT_BOARD_SIZE: u32 = 2;
const DEFAULT_ROULETTE_SLOTS: u32 = 3;

fn default_board_size() -> u32 {
    DEFAULT_BOARD_SIZE
}

fn default_roulette_slots() -> u32 {
    DEFAULT_ROULETTE_SLOTS
}

fn default_floor() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    /// Deck as unit names; duplicates weight the board fill.
    pub deck: Vec<String>,
    #[serde(default = "default_board_size")]
    pub board_size: u32,
    #[serde(default = "default_roulette_slots")]
    pub roulette_slots: u32,
    #[serde(default = "default_floor")]
    pub floor: u32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub carry_over: Vec<String>,
    /// YAML or JSON battle tuning; built-in defaults when absent.
    #[serde(default)]
    pub config_path: Option<String>,
    #[serde(default)]
    pub units_path: Option<String>,
    #[serde(default)]
    pub recipes_path: Option<String>,
}

impl SimulationConfig {
    pub fn new(deck: Vec<String>, seed: u64) -> Self {
        Self {
            deck,
            board_size: DEFAULT_BOARD_SIZE,
            roulette_slots: DEFAULT_ROULETTE_SLOTS,
            floor: 1,
            seed,
            carry_over: Vec::new(),
            config_path: None,
            units_path: None,
            recipes_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationResult {
    pub victory: bool,
    pub gold_earned: u32,
    pub ticks: u64,
    pub draw: Vec<String>,
    pub crafted: Vec<String>,
    pub survivors: Vec<String>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationStats {
    pub samples: u32,
    pub victories: u32,
    pub defeats: u32,
    pub win_rate: f64,
    pub avg_ticks: f64,
    pub crafted_total: u32,
}

/// Catalog from the given files, or the built-in content when neither is set.
pub fn load_catalog(units_path: Option<&str>, recipes_path: Option<&str>) -> Result<Catalog> {
    match (units_path, recipes_path) {
        (None, None) => Ok(Catalog::builtin()?),
        (Some(units), Some(recipes)) => {
            let units_text = fs::read_to_string(units)
                .with_context(|| format!("failed to read units JSON: {}", units))?;
            let recipes_text = fs::read_to_string(recipes)
                .with_context(|| format!("failed to read recipes JSON: {}", recipes))?;
            Catalog::from_json(&units_text, &recipes_text)
                .with_context(|| format!("failed to load catalog from {} and {}", units, recipes))
        }
        _ => bail!("units_path and recipes_path must be given together"),
    }
}

fn load_battle_config(path: Option<&str>) -> Result<BattleConfig> {
    match path {
        Some(p) => BattleConfig::from_path(p),
        None => Ok(BattleConfig::default()),
    }
}

pub fn simulate_battle(cfg: SimulationConfig) -> Result<SimulationResult> {
    let catalog = load_catalog(cfg.units_path.as_deref(), cfg.recipes_path.as_deref())?;
    let battle_config = load_battle_config(cfg.config_path.as_deref())?;
    run_one(&cfg, &catalog, &battle_config, cfg.seed)
}

/// Run `samples` battles with seeds `seed, seed + 1, ...` and summarise them.
pub fn simulate_battle_many(cfg: SimulationConfig, samples: u32) -> Result<SimulationStats> {
    let catalog = load_catalog(cfg.units_path.as_deref(), cfg.recipes_path.as_deref())?;
    let battle_config = load_battle_config(cfg.config_path.as_deref())?;

    let mut victories = 0u32;
    let mut ticks_total = 0u64;
    let mut crafted_total = 0u32;
    for i in 0..samples {
        let res = run_one(&cfg, &catalog, &battle_config, cfg.seed.wrapping_add(i as u64))?;
        if res.victory {
            victories += 1;
        }
        ticks_total += res.ticks;
        crafted_total += res.crafted.len() as u32;
    }

    let n = samples.max(1) as f64;
    Ok(SimulationStats {
        samples,
        victories,
        defeats: samples - victories,
        win_rate: victories as f64 / n,
        avg_ticks: ticks_total as f64 / n,
        crafted_total,
    })
}

fn run_one(
    cfg: &SimulationConfig,
    catalog: &Catalog,
    battle_config: &BattleConfig,
    seed: u64,
) -> Result<SimulationResult> {
    let deck = catalog.templates_for(cfg.deck.as_slice()).context("invalid deck")?;
    let carry_over = catalog
        .templates_for(cfg.carry_over.as_slice())
        .context("invalid carry-over roster")?;

    let mut session = start_battle(
        &deck,
        cfg.board_size,
        cfg.roulette_slots,
        cfg.floor,
        &carry_over,
        catalog,
        battle_config.clone(),
        GameRng::from_seed(seed),
    )?;
    let outcome = session.run_to_completion()?;

    let (draw, crafted) = session
        .spin_outcome()
        .map(|s| (names(&s.draw), names(&s.crafted)))
        .unwrap_or_default();

    Ok(SimulationResult {
        victory: outcome.victory,
        gold_earned: outcome.gold_earned,
        ticks: outcome.ticks,
        draw,
        crafted,
        survivors: names(&outcome.survivors),
        log: session.log().map(str::to_string).collect(),
    })
}

fn names(units: &[Unit]) -> Vec<String> {
    units.iter().map(|u| u.name.clone()).collect()
}
