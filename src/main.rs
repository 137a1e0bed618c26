//! Endless Stairs headless demo
//!
//! Plays seeded runs on autopilot, feeding the simulation the same kind of
//! per-frame input and collision geometry a real host would, and logs what
//! happens. Run with `RUST_LOG=info` (or `debug` for stair respawns).
//!
//! Usage: `endless-stairs [seed] [tuning.json]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use endless_stairs::Tuning;
use endless_stairs::consts::SIM_DT;
use endless_stairs::sim::{
    Aabb, Body, ContactGeometry, GameEvent, GameSession, MoveOutcome, StairKind, TickInput, tick,
};

/// Runs to play before exiting
const RUNS: u32 = 3;
/// Hard cap on simulated time per run (seconds)
const MAX_RUN_SECONDS: f32 = 300.0;

const PLAYER_SIZE: Vec2 = Vec2::new(0.5, 0.6);
const STAIR_SIZE: Vec2 = Vec2::new(0.75, 0.2);

/// Boxes derived from simulation positions: the player stands on top of
/// the stair it last stepped onto and does not move between steps.
struct FrameGeometry {
    player: Body,
    stairs: Vec<Aabb>,
}

impl FrameGeometry {
    fn capture(session: &GameSession) -> Self {
        let feet = session.player().position() + Vec2::new(0.0, STAIR_SIZE.y / 2.0);
        let player = Body::new(
            Aabb::from_center_size(feet + Vec2::new(0.0, PLAYER_SIZE.y / 2.0), PLAYER_SIZE),
            Vec2::ZERO,
        );
        let stairs = session
            .ring()
            .slots()
            .iter()
            .map(|slot| Aabb::from_center_size(slot.position, STAIR_SIZE))
            .collect();
        Self { player, stairs }
    }
}

impl ContactGeometry for FrameGeometry {
    fn player_body(&self) -> Option<Body> {
        Some(self.player)
    }

    fn stair_bounds(&self, slot: usize) -> Option<Aabb> {
        self.stairs.get(slot).copied()
    }
}

fn load_tuning(path: Option<&str>) -> Result<Tuning, String> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json =
        std::fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", path, e))?;
    Tuning::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

fn main() {
    env_logger::init();
    log::info!("Endless Stairs (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(20_240_601u64);

    let tuning = match load_tuning(args.get(2).map(String::as_str)) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            std::process::exit(2);
        }
    };
    let mut session = match GameSession::new(tuning, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not start session: {}", e);
            std::process::exit(2);
        }
    };
    session.set_player_name("autopilot");

    // Bot reaction time varies per press; it gives up after a random number of stairs
    let mut bot_rng = Pcg32::seed_from_u64(seed ^ 0x5eed);

    for run in 1..=RUNS {
        if run > 1 {
            let restart = TickInput {
                restart: true,
                ..Default::default()
            };
            let geometry = FrameGeometry::capture(&session);
            tick(&mut session, &restart, &geometry, SIM_DT);
        }

        let give_up_after: u64 = bot_rng.random_range(40..160);
        let mut frames_until_press: u32 = 0;
        let mut run_time = 0.0;

        while session.is_alive() && run_time < MAX_RUN_SECONDS {
            let press = session.score() < give_up_after && frames_until_press == 0;
            let input = TickInput {
                autopilot: press,
                ..Default::default()
            };
            if press {
                frames_until_press = bot_rng.random_range(8..30);
            } else {
                frames_until_press = frames_until_press.saturating_sub(1);
            }

            let geometry = FrameGeometry::capture(&session);
            let outcome = tick(&mut session, &input, &geometry, SIM_DT);
            run_time += SIM_DT;

            // Host collision callback: stepping onto a confuse stair starts a contact
            if let MoveOutcome::Advanced { slot, .. } = outcome {
                if session.ring().slot(slot).kind == StairKind::ConfuseControl {
                    let geometry = FrameGeometry::capture(&session);
                    session.on_contact_begin(slot, &geometry.player);
                }
            }

            for event in session.drain_events() {
                report(run, &event);
            }
        }
    }

    log::info!(
        "Done: best score {} over {} runs",
        session.best_score(),
        session.retry_count() + 1
    );
}

fn report(run: u32, event: &GameEvent) {
    match event {
        GameEvent::ConfuseStarted { duration } => {
            log::info!("[run {}] Controls reversed for {:.1}s", run, duration)
        }
        GameEvent::ConfuseEnded => log::info!("[run {}] Controls back to normal", run),
        GameEvent::AfterimageStarted => log::debug!("[run {}] Afterimage on", run),
        GameEvent::AfterimageEnded => log::debug!("[run {}] Afterimage off", run),
        GameEvent::GameOver(report) => log::info!(
            "[run {}] {} fell ({}) with score {}{}",
            run,
            report.player_name,
            report.cause.as_str(),
            report.score,
            if report.new_best { " - new best!" } else { "" }
        ),
        GameEvent::Moved { .. } | GameEvent::StairRespawned { .. } | GameEvent::Restarted { .. } => {}
    }
}
