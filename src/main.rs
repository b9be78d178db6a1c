//! Brick Sim headless driver
//!
//! Runs the simulation on a fixed 60 Hz clock with a scripted autopilot and
//! logs a run summary. Handy for soak runs and for reproducing a seed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use brick_sim::Config;
use brick_sim::consts::{FPS, FRAME_MS};
use brick_sim::sim::{GameEvent, GameState, Snapshot, autopilot_input, tick};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 5 * 60 * FPS as u64)]
    frames: u64,

    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final render snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

/// Counters accumulated from the per-tick event feed
#[derive(Debug, Default)]
struct RunStats {
    bricks_destroyed: u32,
    items_collected: u32,
    balls_lost: u32,
    levels_cleared: u32,
    games_over: u32,
}

impl RunStats {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::BrickDestroyed { .. } => self.bricks_destroyed += 1,
                GameEvent::ItemCollected(_) => self.items_collected += 1,
                GameEvent::BallLost => self.balls_lost += 1,
                GameEvent::LevelCleared => self.levels_cleared += 1,
                GameEvent::GameOver => self.games_over += 1,
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = args.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    info!("Brick Sim starting (seed {}, {} frames)", config.seed, args.frames);

    let mut state = GameState::new(config);
    let mut stats = RunStats::default();
    let mut frames_run = 0;

    for frame in 0..args.frames {
        let input = autopilot_input(&state);
        tick(&mut state, &input, frame * FRAME_MS);
        stats.record(&state.events);
        frames_run = frame + 1;

        if state.quit_requested {
            break;
        }
    }

    info!(
        "Ran {} frames ({:.1}s simulated): level {}, score {}, lives {}, phase {}",
        frames_run,
        (frames_run * FRAME_MS) as f64 / 1000.0,
        state.level,
        state.score,
        state.lives,
        state.phase.as_str()
    );
    info!(
        "Bricks destroyed {}, items collected {}, balls lost {}, levels cleared {}, games over {}",
        stats.bricks_destroyed,
        stats.items_collected,
        stats.balls_lost,
        stats.levels_cleared,
        stats.games_over
    );
    if let Some(best) = state.leaderboard.top_score() {
        info!("Best score this run: {}", best);
    }

    if args.snapshot {
        let json = Snapshot::capture(&state)
            .to_json()
            .context("failed to serialize snapshot")?;
        println!("{json}");
    }

    Ok(())
}
