//! Savanna Simulation Engine
//!
//! Runs the predator-prey grid world headlessly: spawns the configured
//! population, advances rounds, appends round events as JSONL and writes
//! periodic world snapshots.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use savanna_core::components::world::WorldState;
use savanna_core::config::Config;
use savanna_core::events::{EventLogger, RoundEvents};
use savanna_core::output::{self, SnapshotTracker};
use savanna_core::setup;
use savanna_core::systems::run_round;

use savanna_events::EventKind;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "savanna_sim")]
#[command(about = "A grid-based predator-prey simulation engine")]
struct Args {
    /// Path to the tuning file (defaults to savanna.toml, falling back to
    /// built-in defaults)
    #[arg(long)]
    config: Option<String>,

    /// Random seed, overriding the tuning file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds to simulate, overriding the tuning file
    #[arg(long)]
    rounds: Option<u64>,

    /// Initial lion count, overriding the tuning file
    #[arg(long)]
    lions: Option<usize>,

    /// Initial antelope count, overriding the tuning file
    #[arg(long)]
    antelopes: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Could not load {path}: {error}");
                std::process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        config.world.rounds = rounds;
    }
    if let Some(lions) = args.lions {
        config.spawn.lions = lions;
    }
    if let Some(antelopes) = args.antelopes {
        config.spawn.antelopes = antelopes;
    }

    println!("Savanna Simulation Engine");
    println!("=========================");
    println!("Seed: {}", config.world.seed);
    println!("Rounds: {}", config.world.rounds);
    println!("World: {} x {}", config.world.height, config.world.width);
    println!(
        "Population: {} antelopes, {} lions",
        config.spawn.antelopes, config.spawn.lions
    );
    println!();

    let mut world = setup::build_world(&config);
    println!("Spawned {} animals", world.resource::<WorldState>().animals);

    if let Some(parent) = std::path::Path::new(&config.output.events_path).parent() {
        if let Err(error) = std::fs::create_dir_all(parent) {
            tracing::warn!("could not create output directory: {error}");
        }
    }
    let mut event_logger = match EventLogger::new(&config.output.events_path) {
        Ok(logger) => logger,
        Err(error) => {
            tracing::warn!(
                "could not open {} ({error}); events will not be written",
                config.output.events_path
            );
            EventLogger::null()
        }
    };

    println!();
    println!("Starting simulation...");
    println!();

    for _ in 0..config.world.rounds {
        run_round(&mut world);
        let round = world.resource::<WorldState>().round;

        let events = world.resource_mut::<RoundEvents>().drain();
        if !events.is_empty() {
            if let Err(error) = event_logger.log_batch(&events) {
                tracing::warn!("could not write round events: {error}");
            }
            if round % 10 == 0 {
                let births = events.iter().filter(|event| event.kind == EventKind::Birth).count();
                let deaths = events.iter().filter(|event| event.kind == EventKind::Death).count();
                let attacks = events.iter().filter(|event| event.kind == EventKind::Attack).count();
                println!(
                    "[Round {:>4}] {} events (births: {}, deaths: {}, attacks: {})",
                    round,
                    events.len(),
                    births,
                    deaths,
                    attacks
                );
            }
        }

        let should_snapshot = world.resource::<SnapshotTracker>().should_snapshot(round);
        if should_snapshot {
            let snapshot = output::capture(&mut world);
            match output::write_snapshot(&config.output.snapshot_dir, &snapshot) {
                Ok(path) => tracing::debug!("wrote snapshot {}", path.display()),
                Err(error) => tracing::warn!("could not write snapshot at round {round}: {error}"),
            }
            world.resource_mut::<SnapshotTracker>().mark_snapshot(round);
        }

        if round % 100 == 0 {
            println!(
                "Round {} / {} ({} animals alive)",
                round,
                config.world.rounds,
                world.resource::<WorldState>().animals
            );
        }
    }

    let final_snapshot = output::capture(&mut world);
    if let Err(error) = output::write_snapshot(&config.output.snapshot_dir, &final_snapshot) {
        tracing::warn!("could not write final snapshot: {error}");
    }
    if let Err(error) = event_logger.flush() {
        tracing::warn!("could not flush event log: {error}");
    }

    println!();
    println!(
        "Simulation complete. Ran {} rounds, {} animals remain, {} events logged.",
        world.resource::<WorldState>().round,
        world.resource::<WorldState>().animals,
        event_logger.event_count()
    );
}
