//! Settled landing detection on confuse stairs
//!
//! When the player first touches a confuse stair, a monitor is created for
//! that (player, stair) contact. Every tick it checks that the player is
//! standing on top of the stair, overlaps it enough, is not jumping upward,
//! and has been still for a short while. The monitor ends on success, when
//! the boxes separate, or when its watch window runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Aabb, Body};
use crate::consts::SETTLE_EPSILON;
use crate::tuning::LandingTuning;

/// Result of one monitor step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingStatus {
    /// Still watching
    Watching,
    /// All conditions held: the confuse effect should be applied
    Triggered,
    /// The player left the stair before settling
    Left,
    /// Watch window ran out without a settled landing
    TimedOut,
}

impl LandingStatus {
    pub fn is_finished(self) -> bool {
        self != LandingStatus::Watching
    }
}

/// The four landing conditions evaluated for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LandingChecks {
    pub vertical: bool,
    pub horizontal: bool,
    pub not_ascending: bool,
    pub settled: bool,
}

impl LandingChecks {
    pub fn all(&self) -> bool {
        self.vertical && self.horizontal && self.not_ascending && self.settled
    }
}

/// Per-contact landing watch state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingMonitor {
    slot: usize,
    tuning: LandingTuning,
    elapsed: f32,
    stable: f32,
    last_position: Vec2,
    status: LandingStatus,
}

impl LandingMonitor {
    /// Start watching `slot`, with the player currently at `player_position`
    pub fn new(slot: usize, player_position: Vec2, tuning: LandingTuning) -> Self {
        Self {
            slot,
            tuning,
            elapsed: 0.0,
            stable: 0.0,
            last_position: player_position,
            status: LandingStatus::Watching,
        }
    }

    /// Ring slot this monitor watches
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn status(&self) -> LandingStatus {
        self.status
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Time the player has been still
    pub fn stable_time(&self) -> f32 {
        self.stable
    }

    /// Evaluate the conditions against the current boxes and advance by `dt`
    pub fn step(&mut self, dt: f32, player: &Body, stair: &Aabb) -> LandingStatus {
        if self.status.is_finished() {
            return self.status;
        }
        if self.elapsed >= self.tuning.monitor_timeout {
            return self.finish(LandingStatus::TimedOut);
        }

        let checks = self.evaluate(dt, player, stair);
        if checks.all() {
            return self.finish(LandingStatus::Triggered);
        }

        if !player.bounds.intersects(stair) {
            return self.finish(LandingStatus::Left);
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.tuning.monitor_timeout {
            return self.finish(LandingStatus::TimedOut);
        }
        LandingStatus::Watching
    }

    /// Stop watching without an outcome (death, restart, stair recycled)
    pub fn cancel(&mut self) {
        self.status = LandingStatus::Left;
    }

    fn evaluate(&mut self, dt: f32, player: &Body, stair: &Aabb) -> LandingChecks {
        let bounds = &player.bounds;

        let vertical = bounds.min.y >= stair.max.y - self.tuning.stand_epsilon;

        let overlap = bounds.horizontal_overlap(stair);
        let width = bounds.width();
        let overlap_ratio = if width > 0.0 { overlap / width } else { 0.0 };
        let horizontal = overlap > 0.0 && overlap_ratio >= self.tuning.overlap_ratio;

        let not_ascending = player.velocity.y <= self.tuning.upward_ignore_velocity;

        let position = player.position();
        if position.distance(self.last_position) < SETTLE_EPSILON {
            self.stable += dt.max(0.0);
        } else {
            self.stable = 0.0;
        }
        self.last_position = position;
        let settled = self.stable >= self.tuning.settle_time;

        LandingChecks {
            vertical,
            horizontal,
            not_ascending,
            settled,
        }
    }

    fn finish(&mut self, status: LandingStatus) -> LandingStatus {
        self.status = status;
        status
    }
}
