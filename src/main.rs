//! Mingle Arena - headless tournament runner
//!
//! Runs a full tournament without a display. The human competitor either
//! stands still (and is usually eliminated in the first round) or, with
//! `--pilot`, is steered by the scripted pilot.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use mingle_arena::arena::{HostInput, Pilot, Tournament, TournamentResult, TournamentStatus};
use mingle_arena::core::config::{load_config, TournamentConfig};
use mingle_arena::core::error::{ArenaError, Result};
use tracing_subscriber::EnvFilter;

/// Headless shelter elimination tournament
#[derive(Parser, Debug)]
#[command(name = "mingle_arena")]
#[command(about = "Run a shelter elimination tournament and report the outcome")]
struct Args {
    /// TOML config file (defaults are used for missing keys)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of competitors
    #[arg(long)]
    entities: Option<u32>,

    /// Override the preferred room size
    #[arg(long)]
    room_size: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Steer the human with the scripted pilot
    #[arg(long)]
    pilot: bool,

    /// Run rooms one after another instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mingle_arena=info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let start = Instant::now();
    let mut tournament = Tournament::new(config)?;
    let result = if args.pilot {
        run_piloted(&mut tournament, args.dt)?
    } else {
        tournament.run(args.dt)?
    };
    let elapsed = start.elapsed();

    match args.format.as_str() {
        "json" => println!("{}", result.to_json()),
        _ => {
            println!("{}", result.summary());
            println!("Seed: {}", result.seed);
            println!("Actual time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
        }
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<TournamentConfig> {
    if !(args.dt.is_finite() && args.dt > 0.0) {
        return Err(ArenaError::InvalidConfig(format!(
            "--dt ({}) must be a positive number of seconds",
            args.dt
        )));
    }
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TournamentConfig::default(),
    };
    if let Some(n) = args.entities {
        config.entity_count = n;
    }
    if let Some(size) = args.room_size {
        config.room_size = size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.sequential {
        config.parallel_rooms = false;
    }
    config.validate()?;
    Ok(config)
}

/// Host loop: feed pilot input for the human's room every tick
fn run_piloted(tournament: &mut Tournament, dt: f32) -> Result<TournamentResult> {
    let human = tournament.human_id();
    let pilot = Pilot::new(tournament.config().human_attack_radius);

    while tournament.status() != TournamentStatus::Complete {
        tournament.start_round()?;
        loop {
            let input = tournament
                .room_of(human)
                .map(|room| pilot.steer(&room.snapshot(), human))
                .unwrap_or_else(HostInput::idle);
            if tournament.tick(dt, &input)?.is_some() {
                break;
            }
        }
    }
    Ok(tournament.result())
}
