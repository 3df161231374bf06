//! Horde Survival headless runner
//!
//! Plays one run with the autopilot at full speed, logs milestones and
//! records the result on the local leaderboard.
//!
//! Usage: `horde-survival [settings.json]`. Set `RUST_LOG=info` to see progress.

use horde_survival::highscores::format_duration;
use horde_survival::sim::{
    GameEvent, GamePhase, ScatteredRocks, World, autopilot, select_upgrade, tick,
};
use horde_survival::{HighScores, RunRecorder, Settings};

const SCORES_PATH: &str = "horde_scores.json";
/// Safety stop for runs that never end (about 20 simulated minutes)
const MAX_TICKS: u64 = 60 * 60 * 20;

fn main() {
    env_logger::init();
    log::info!("Horde Survival (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            log::warn!("Using default settings ({})", e);
            Settings::default()
        }),
        None => Settings::default(),
    };

    let mut terrain = ScatteredRocks::new(settings.seed);
    let mut world = World::new(settings);

    while !world.is_over() && world.time_ticks < MAX_TICKS {
        if world.phase == GamePhase::LevelUp {
            // Autopilot always takes the first offer
            select_upgrade(&mut world, 0);
        }
        let input = autopilot(&world);
        tick(&mut world, &input, &mut terrain);

        for event in world.drain_events() {
            match event {
                GameEvent::BossSpawned { wave, health } => log::info!(
                    "[{}] boss for wave {} ({:.0} hp)",
                    format_duration(world.elapsed),
                    wave,
                    health
                ),
                GameEvent::FinalBossesSpawned { .. } => {
                    log::info!("[{}] the twins have arrived", format_duration(world.elapsed))
                }
                GameEvent::LevelUp { level, .. } => log::debug!("level {}", level),
                _ => {}
            }
        }
    }

    let Some(summary) = world.summary.clone() else {
        log::warn!("Run stopped after {} ticks without finishing", world.time_ticks);
        return;
    };

    println!(
        "{} | score {} | kills {} | level {} | wave {} | survived {}",
        if summary.victory { "VICTORY" } else { "GAME OVER" },
        summary.score,
        summary.kills,
        summary.level,
        summary.wave,
        format_duration(summary.survival_secs)
    );

    let mut scores = HighScores::load_or_default(SCORES_PATH);
    if let Some(rank) = scores.record(&summary) {
        println!("New high score, rank #{}", rank);
        if let Err(e) = scores.save(SCORES_PATH) {
            log::warn!("Could not save leaderboard: {}", e);
        }
    }
}
