//! Blast Arena headless runner
//!
//! Plays a seeded session on autopilot and logs what happens:
//!
//! ```text
//! RUST_LOG=info blast-arena [seed] [seconds]
//! ```
//!
//! The final snapshot is printed as JSON on stdout.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use blast_arena::Settings;
use blast_arena::sim::{Command, GameEvent, GameSession};

/// Host frame rate the autopilot ticks at
const FRAME_DT: f32 = 1.0 / 60.0;

/// Chance per frame that the autopilot issues a command
const COMMAND_CHANCE: f64 = 0.08;

const AUTOPILOT_COMMANDS: [Command; 5] = [
    Command::UP,
    Command::DOWN,
    Command::LEFT,
    Command::RIGHT,
    Command::PlaceBomb,
];

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse::<u64>().ok());
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(60.0);

    let settings = Settings::default();
    let session = match seed {
        Some(seed) => GameSession::with_seed(settings, seed),
        None => GameSession::new(settings),
    };
    let mut session = match session {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start session: {e}");
            return;
        }
    };
    log::info!("Blast Arena starting (seed {}, {seconds}s)", session.seed());

    // Autopilot input is seeded off the session so runs replay exactly
    let mut pilot = Pcg32::seed_from_u64(session.seed().wrapping_add(1));
    let frames = (seconds / FRAME_DT).ceil() as u64;
    let mut deaths = 0u32;
    let mut best = 0u64;

    for _ in 0..frames {
        if pilot.random_bool(COMMAND_CHANCE) {
            let command = AUTOPILOT_COMMANDS[pilot.random_range(0..AUTOPILOT_COMMANDS.len())];
            session.issue_command(command);
        }

        for event in session.tick(FRAME_DT) {
            if event == GameEvent::PlayerDied {
                deaths += 1;
            }
            log::info!("{:>7.2}s {:?}", session.state().clock, event);
        }
        best = best.max(session.score());
    }

    log::info!("Finished: {deaths} deaths, best score {best}");

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}
