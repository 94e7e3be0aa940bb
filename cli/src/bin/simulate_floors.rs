use clap::Parser;
use roulette_cli::read_deck_file;
use roulette_engine::api::{simulate_battle_many, SimulationConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate-floors")]
#[command(about = "Monte Carlo sim: win rate of one deck across a range of floors")]
struct Args {
    /// JSON array of deck unit names (defaults to three base units)
    #[arg(long)]
    deck_file: Option<PathBuf>,

    /// Number of trials per floor
    #[arg(long, default_value_t = 200)]
    trials: u32,

    /// First floor to simulate
    #[arg(long, default_value_t = 1)]
    from: u32,

    /// Last floor to simulate (inclusive)
    #[arg(long, default_value_t = 10)]
    to: u32,

    /// Board edge length
    #[arg(long, default_value_t = 2)]
    board_size: u32,

    /// Roulette slot count
    #[arg(long, default_value_t = 3)]
    slots: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Optional battle tuning file (YAML/JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

const DEFAULT_DECK: [&str; 3] = ["하급 검사", "하급 마법사", "하급 궁수"];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.from == 0 || args.to < args.from {
        anyhow::bail!("floor range must satisfy 1 <= from <= to");
    }

    let deck: Vec<String> = match args.deck_file.as_ref() {
        Some(path) => read_deck_file(path)?,
        None => DEFAULT_DECK.iter().map(|s| s.to_string()).collect(),
    };

    println!("simulate-floors results");
    println!("-----------------------");
    println!("deck:               {}", deck.join(", "));
    println!("board / slots:      {}x{} / {}", args.board_size, args.board_size, args.slots);
    println!("trials per floor:   {}", args.trials);
    println!();
    println!("floor  win rate  avg ticks  crafted/battle");

    for floor in args.from..=args.to {
        let mut cfg = SimulationConfig::new(deck.clone(), args.seed);
        cfg.floor = floor;
        cfg.board_size = args.board_size;
        cfg.roulette_slots = args.slots;
        cfg.config_path = args
            .config
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let stats = simulate_battle_many(cfg, args.trials)?;
        let crafted_rate = stats.crafted_total as f64 / args.trials.max(1) as f64;
        println!(
            "{:>5}  {:>7.1}%  {:>9.1}  {:>14.2}",
            floor,
            stats.win_rate * 100.0,
            stats.avg_ticks,
            crafted_rate
        );
    }

    Ok(())
}
