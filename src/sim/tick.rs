//! Per-frame simulation tick
//!
//! Single entry point the host calls once per frame. Ordering within a tick:
//! restart, clock and player timers, move, landing monitors, stair fades.
//! Timers run before the move so an expiring deadline or confuse effect
//! always takes priority over input arriving in the same frame.

use super::bounds::ContactGeometry;
use super::player::MoveOutcome;
use super::state::GameSession;
use super::stairs::Turn;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left/right key pressed this frame
    pub turn: Option<Turn>,
    /// Restart requested (game over screen button)
    pub restart: bool,
    /// Demo mode - press the correct key this frame when `turn` is empty
    pub autopilot: bool,
}

/// Advance the session by one frame of length `dt`
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    geometry: &dyn ContactGeometry,
    dt: f32,
) -> MoveOutcome {
    if input.restart {
        session.restart();
    }

    session.advance(dt);

    let turn = match (input.turn, input.autopilot) {
        (Some(turn), _) => Some(turn),
        (None, true) => session.player().winning_input(session.ring()),
        (None, false) => None,
    };
    let outcome = match turn {
        Some(turn) => session.resolve_move(turn),
        None => MoveOutcome::Ignored,
    };

    session.update_landings(dt, geometry);
    session.advance_stairs(dt);

    outcome
}
