//! Arena Round Demo
//!
//! Runs one scripted round of the arena simulation with logging
//! presentation, then replays the same input to verify determinism.
//!
//! Usage: `arena-round [config.json]` (defaults to the built-in duel).

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arena_round::{
    ArenaConfig, Arena, ScriptedInput, TICK_DURATION, TICK_RATE, VERSION,
    core::fixed::{to_fixed, to_float, FIXED_ONE},
    game::{
        events::ArenaEventData,
        presentation::TracingPresentation,
        tick::{replay_round, step},
    },
};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena Round v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => ArenaConfig::from_path(&path)
            .with_context(|| format!("loading arena config from {}", path))?,
        None => ArenaConfig::default(),
    };
    info!("Round Duration: {} seconds", config.round_seconds);

    demo_round(&config)
}

/// Input for one frame of the demo script.
fn scripted_frame(input: &mut ScriptedInput, frame: u32) {
    input.end_frame();

    // Red walks toward the middle, then holds position and fires
    let red_axis = if frame < 40 { FIXED_ONE } else { 0 };
    input.set_axis("P1 Horizontal", red_axis);
    if frame % 45 == 20 {
        input.press("P1 Fire");
    }

    // Blue strafes back and forth and hops now and then
    let blue_axis = if (frame / 90) % 2 == 0 { -to_fixed(0.5) } else { to_fixed(0.5) };
    input.set_axis("P2 Horizontal", blue_axis);
    if frame % 120 == 60 {
        input.press("P2 Jump");
    }
    if frame % 70 == 35 {
        input.press("P2 Fire");
    }
}

/// Demo function to exercise the simulation.
fn demo_round(config: &ArenaConfig) -> Result<()> {
    info!("=== Starting Demo Round ===");

    let mut arena = Arena::bootstrap(config, Box::new(TracingPresentation::new()))
        .context("bootstrapping arena")?;

    for combatant in arena.roster.iter() {
        let (x, y) = combatant.position.to_floats();
        info!("Combatant {} '{}' at ({:.2}, {:.2})", combatant.id.0, combatant.name, x, y);
    }

    arena.start_round();

    let max_frames = (config.round_seconds.ceil() as u32 + 1) * TICK_RATE;
    let mut input = ScriptedInput::new();
    let mut frames = Vec::new();
    let mut total_events = 0;

    for frame in 0..max_frames {
        scripted_frame(&mut input, frame);
        frames.push(input.clone());

        let result = step(&mut arena, &input, TICK_DURATION);
        total_events += result.events.len();

        // Log important events
        for event in &result.events {
            match &event.data {
                ArenaEventData::DamageTaken { combatant, health, .. } => {
                    info!("Combatant {} hit, health {:.2}", combatant.0, to_float(*health));
                }
                ArenaEventData::CombatantEliminated { combatant } => {
                    info!("Combatant {} eliminated", combatant.0);
                }
                ArenaEventData::GoalEntered { goal, body, counted } => {
                    info!("{} entered goal {} (counted: {})", body, goal, counted);
                }
                _ => {}
            }
        }

        if frame % (10 * TICK_RATE) == 0 {
            info!(
                "Tick {}: {} projectiles, {} events so far",
                arena.tick,
                arena.projectiles.len(),
                total_events
            );
        }

        if let Some(outcome) = result.outcome {
            info!("Round ended at tick {}: {} ({})", arena.tick, outcome, outcome.label());
            break;
        }
    }

    // Print final results
    info!("=== Round Results ===");
    let hash = arena.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    for combatant in arena.roster.iter() {
        info!(
            "{}: health {:.2} / {:.2}",
            combatant.name,
            to_float(combatant.health()),
            to_float(combatant.max_health())
        );
    }
    info!("Total events: {}", total_events);

    arena.shutdown();

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay_round(config, &frames, TICK_DURATION).context("replaying round")?;
    let replay_hash = replayed.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    Ok(())
}
