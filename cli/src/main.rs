use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use roulette_cli::read_deck_file;
use roulette_engine::{
    attempt_upgrade, upgrade_requirement, BattleConfig, Catalog, GameRng, Ledger, NodeKind,
    ProgressionConfig, RunState, RunStatus, Track, UpgradeKind, Unit,
};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum Kind {
    Board,
    Roulette,
}

impl From<Kind> for UpgradeKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Board => UpgradeKind::Board,
            Kind::Roulette => UpgradeKind::Roulette,
        }
    }
}

#[derive(clap::Args)]
struct DeckArgs {
    /// Deck unit by name (repeatable). Defaults to the first three base units.
    #[arg(long = "unit")]
    units: Vec<String>,
    /// JSON array of unit names; UTF-8 or any BOM-marked encoding
    #[arg(long)]
    deck_file: Option<PathBuf>,
    /// Battle tuning file (YAML, or JSON by extension)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fill a board, spin the roulette and fight one skirmish
    Battle {
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Floor index (enemy count and gold reward scale with it)
        #[arg(long, default_value_t = 1)]
        floor: u32,
        /// Board edge length
        #[arg(long, default_value_t = 2)]
        board_size: u32,
        /// Roulette slot count
        #[arg(long, default_value_t = 3)]
        slots: u32,
        /// Carry-over unit by name (repeatable)
        #[arg(long = "carry")]
        carry: Vec<String>,
        #[command(flatten)]
        deck: DeckArgs,
        /// Print the result as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Print the full battle log
        #[arg(long, default_value_t = false)]
        log: bool,
    },
    /// Auto-play a run floor by floor until it is lost or cleared
    Run {
        /// RNG base seed (floor f uses seed+f)
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Stop after this many floors
        #[arg(long, default_value_t = 25)]
        floors: u32,
        /// Spend gold on roulette, then board upgrades, between battles
        #[arg(long, default_value_t = false)]
        auto_upgrade: bool,
        #[command(flatten)]
        deck: DeckArgs,
    },
    /// Apply upgrade purchases to a ledger and show each step
    Upgrade {
        #[arg(long, value_enum, default_value_t = Kind::Board)]
        kind: Kind,
        #[arg(long, default_value_t = 500)]
        gold: u32,
        /// Starting capacity of the chosen track
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long, default_value_t = 0)]
        progress: u32,
        /// Number of purchase attempts
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Dump the built-in units and recipes as JSON
    Catalog {
        /// Single-line JSON instead of pretty-printed
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
}

#[derive(Parser)]
#[command(name = "roulette-cli")]
#[command(about = "Summon roulette auto-battler harness")]
struct Cli {
    /// Log engine events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "roulette_engine=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_deck(args: &DeckArgs, catalog: &Catalog) -> anyhow::Result<Vec<Unit>> {
    let mut names = args.units.clone();
    if let Some(path) = args.deck_file.as_ref() {
        names.extend(read_deck_file(path)?);
    }
    if names.is_empty() {
        return Ok(catalog.base_units().iter().take(3).cloned().collect());
    }
    Ok(catalog.templates_for(names.as_slice())?)
}

fn load_config(args: &DeckArgs) -> anyhow::Result<BattleConfig> {
    match args.config.as_ref() {
        Some(path) => BattleConfig::from_path(path),
        None => Ok(BattleConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let catalog = Catalog::builtin()?;
    tracing::debug!(
        base = catalog.base_units().len(),
        special = catalog.special_units().len(),
        recipes = catalog.recipes().len(),
        "catalog loaded"
    );

    match cli.cmd {
        Cmd::Battle {
            seed,
            floor,
            board_size,
            slots,
            carry,
            deck,
            json,
            log,
        } => {
            let config = load_config(&deck)?;
            let units = load_deck(&deck, &catalog)?;
            let carry_over = catalog.templates_for(carry.as_slice())?;
            let mut session = roulette_engine::start_battle(
                &units,
                board_size,
                slots,
                floor,
                &carry_over,
                &catalog,
                config,
                GameRng::from_seed(seed),
            )?;
            let outcome = session.run_to_completion()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                if let Some(spin) = session.spin_outcome() {
                    let draw: Vec<&str> = spin.draw.iter().map(|u| u.name.as_str()).collect();
                    let crafted: Vec<&str> = spin.crafted.iter().map(|u| u.name.as_str()).collect();
                    println!("draw: {}", draw.join(", "));
                    println!("crafted: {}", if crafted.is_empty() { "-".to_string() } else { crafted.join(", ") });
                }
                println!(
                    "victory={} gold={} ticks={} survivors={}",
                    outcome.victory,
                    outcome.gold_earned,
                    outcome.ticks,
                    outcome.survivors.len()
                );
            }
            if log {
                for line in session.log() {
                    println!("{}", line);
                }
            }
        }
        Cmd::Run {
            seed,
            floors,
            auto_upgrade,
            deck,
        } => {
            let config = load_config(&deck)?;
            let progression = ProgressionConfig::default();
            let units = load_deck(&deck, &catalog)?;
            let mut run = RunState::new(&units, &progression)?;

            for _ in 0..floors {
                if run.status != RunStatus::InProgress {
                    break;
                }
                if auto_upgrade {
                    while run.upgrade(UpgradeKind::Roulette, &progression).is_ok() {}
                    while run.upgrade(UpgradeKind::Board, &progression).is_ok() {}
                }
                let floor = run.floor;
                let node = if floor >= roulette_engine::run::MAX_FLOORS {
                    NodeKind::Boss
                } else {
                    NodeKind::Battle
                };
                let mut session = run.start_battle(
                    &catalog,
                    config.clone(),
                    GameRng::from_seed(seed.wrapping_add(floor as u64)),
                )?;
                let outcome = session.run_to_completion()?;
                run.apply_battle_outcome(node, &outcome);
                println!(
                    "floor {:>2}: {} ticks={} gold={} board={} slots={} carry={}",
                    floor,
                    if outcome.victory { "WIN " } else { "LOSS" },
                    outcome.ticks,
                    run.gold(),
                    run.ledger.board_size(),
                    run.ledger.roulette_slots(),
                    run.carry_over.len()
                );
            }
            println!(
                "run {:?} at floor {} with {} gold, {} essence",
                run.status,
                run.floor,
                run.gold(),
                run.essence
            );
        }
        Cmd::Upgrade {
            kind,
            gold,
            capacity,
            progress,
            times,
        } => {
            let progression = ProgressionConfig::default();
            let kind: UpgradeKind = kind.into();
            let mut ledger = Ledger::new(gold, &progression);
            let start = Track {
                capacity: capacity.unwrap_or(ledger.track(kind).capacity),
                progress,
            };
            match kind {
                UpgradeKind::Board => ledger.board = start,
                UpgradeKind::Roulette => ledger.roulette = start,
            }
            for i in 1..=times {
                match attempt_upgrade(kind, &ledger, &progression) {
                    Ok(next) => {
                        ledger = next;
                        let t = ledger.track(kind);
                        println!(
                            "#{} {} capacity={} progress={}/{} gold={}",
                            i,
                            kind,
                            t.capacity,
                            t.progress,
                            upgrade_requirement(t.capacity),
                            ledger.gold
                        );
                    }
                    Err(e) => {
                        println!("#{} rejected: {}", i, e);
                        break;
                    }
                }
            }
        }
        Cmd::Catalog { compact } => {
            let dump = serde_json::json!({
                "base": catalog.base_units(),
                "special": catalog.special_units(),
                "recipes": catalog.recipes(),
            });
            if compact {
                println!("{}", serde_json::to_string(&dump)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
        }
    }
    Ok(())
}
