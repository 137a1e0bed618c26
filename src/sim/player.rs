//! Player state machine
//!
//! `AwaitingFirstMove -> Active -> Dead`, and back to `AwaitingFirstMove`
//! on reset. Each move is judged against the stair under the turn cursor;
//! the cursor advances one slot per move whatever the outcome.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{AfterimageTrigger, ConfuseEffect, DeathTimer};
use super::stairs::{StairRing, Turn};
use crate::stair_origin;
use crate::tuning::Tuning;

/// Player lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Waiting for the first input; the move deadline is not running
    AwaitingFirstMove,
    Active,
    /// Frozen until reset
    Dead,
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    WrongTurn,
    Timeout,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::WrongTurn => "wrong turn",
            DeathCause::Timeout => "timeout",
        }
    }
}

/// Result of `resolve_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Player is dead (or there are no stairs); input dropped
    Ignored,
    /// Correct turn
    Advanced {
        /// Slot the player stepped onto
        slot: usize,
        /// Slot recycled by this move, if any
        respawned: Option<usize>,
        afterimage_started: bool,
    },
    Died(DeathCause),
}

/// State changes caused by a timer tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEvents {
    pub confuse_ended: bool,
    pub afterimage_ended: bool,
    pub died: Option<DeathCause>,
}

/// Where the player stands before the first move: one right step below the first stair
pub fn player_start() -> Vec2 {
    stair_origin() - Turn::Right.offset()
}

/// Player state and move validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStateMachine {
    phase: PlayerPhase,
    death_cause: Option<DeathCause>,
    /// Successful moves since the last reset
    move_count: u32,
    /// Slot the next move is judged against
    turn_cursor: usize,
    /// Next slot to recycle
    spawn_cursor: usize,
    facing: Turn,
    position: Vec2,
    respawn_after_moves: u32,
    death_timer: DeathTimer,
    confuse: ConfuseEffect,
    afterimage: AfterimageTrigger,
}

impl PlayerStateMachine {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: PlayerPhase::AwaitingFirstMove,
            death_cause: None,
            move_count: 0,
            turn_cursor: 0,
            spawn_cursor: 0,
            facing: Turn::Right,
            position: player_start(),
            respawn_after_moves: tuning.respawn_after_moves,
            death_timer: DeathTimer::new(tuning.move_deadline),
            confuse: ConfuseEffect::new(tuning.confuse_duration),
            afterimage: AfterimageTrigger::new(tuning.afterimage),
        }
    }

    /// Back to the pre-game state
    pub fn reset(&mut self) {
        self.phase = PlayerPhase::AwaitingFirstMove;
        self.death_cause = None;
        self.move_count = 0;
        self.turn_cursor = 0;
        self.spawn_cursor = 0;
        self.facing = Turn::Right;
        self.position = player_start();
        self.death_timer.reset();
        self.confuse.clear();
        self.afterimage.clear();
    }

    /// Judge a move at session time `now`
    pub fn resolve_move(&mut self, requested: Turn, now: f64, ring: &mut StairRing) -> MoveOutcome {
        if self.phase == PlayerPhase::Dead || ring.is_empty() {
            return MoveOutcome::Ignored;
        }

        self.phase = PlayerPhase::Active;
        self.death_timer.reset();
        let afterimage_started = self.afterimage.record_move(now);

        let effective = self.confuse.apply(requested);
        self.facing = effective;

        let slot = self.turn_cursor % ring.len();
        let expected = ring.slot(slot).turn;
        self.turn_cursor = (slot + 1) % ring.len();

        if effective != expected {
            self.die(DeathCause::WrongTurn);
            return MoveOutcome::Died(DeathCause::WrongTurn);
        }

        self.move_count += 1;
        self.position += effective.offset();

        let respawned = if self.move_count > self.respawn_after_moves {
            let index = self.spawn_cursor % ring.len();
            ring.respawn(index);
            self.spawn_cursor = (index + 1) % ring.len();
            Some(index)
        } else {
            None
        };

        MoveOutcome::Advanced {
            slot,
            respawned,
            afterimage_started,
        }
    }

    /// Run timers for a tick of length `dt` ending at session time `now`
    pub fn advance(&mut self, dt: f32, now: f64) -> TimerEvents {
        let mut events = TimerEvents::default();
        if self.phase == PlayerPhase::Dead {
            return events;
        }

        events.confuse_ended = self.confuse.update(now);
        events.afterimage_ended = self.afterimage.update(now);

        if self.phase == PlayerPhase::Active && self.death_timer.advance(dt) {
            self.die(DeathCause::Timeout);
            events.died = Some(DeathCause::Timeout);
        }
        events
    }

    /// Apply the confuse effect; returns the duration used, or None when dead
    pub fn activate_confuse(&mut self, duration: f32, now: f64) -> Option<f32> {
        if self.phase == PlayerPhase::Dead {
            return None;
        }
        Some(self.confuse.activate(duration, now))
    }

    fn die(&mut self, cause: DeathCause) {
        self.phase = PlayerPhase::Dead;
        self.death_cause = Some(cause);
        self.confuse.clear();
        self.afterimage.clear();
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase != PlayerPhase::Dead
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn turn_cursor(&self) -> usize {
        self.turn_cursor
    }

    pub fn spawn_cursor(&self) -> usize {
        self.spawn_cursor
    }

    pub fn facing(&self) -> Turn {
        self.facing
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn confuse(&self) -> &ConfuseEffect {
        &self.confuse
    }

    pub fn afterimage(&self) -> &AfterimageTrigger {
        &self.afterimage
    }

    pub fn death_timer(&self) -> &DeathTimer {
        &self.death_timer
    }

    /// Turn the player has to press to survive the next move
    pub fn winning_input(&self, ring: &StairRing) -> Option<Turn> {
        if !self.is_alive() || ring.is_empty() {
            return None;
        }
        let expected = ring.slot(self.turn_cursor % ring.len()).turn;
        // Inverting twice restores the expected turn
        Some(self.confuse.apply(expected))
    }
}
