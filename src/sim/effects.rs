//! Timed player effects
//!
//! - `ConfuseEffect`: reversed controls until a deadline
//! - `AfterimageTrigger`: cosmetic trail after rapid consecutive moves
//! - `DeathTimer`: per-move input deadline
//!
//! All three are driven by session time in seconds. Calling their update
//! methods repeatedly with the same time is harmless.

use serde::{Deserialize, Serialize};

use super::stairs::Turn;
use crate::tuning::AfterimageTuning;

/// Reversed controls status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfuseEffect {
    active: bool,
    end_time: f64,
    /// Length of the current activation (for the status gauge)
    duration: f32,
    default_duration: f32,
}

impl ConfuseEffect {
    pub fn new(default_duration: f32) -> Self {
        Self {
            active: false,
            end_time: 0.0,
            duration: 0.0,
            default_duration,
        }
    }

    /// Start (or restart) the effect. A non-positive duration means "use the default".
    /// Returns the duration actually applied.
    pub fn activate(&mut self, duration: f32, now: f64) -> f32 {
        let duration = if duration > 0.0 {
            duration
        } else {
            self.default_duration
        };
        self.active = true;
        self.duration = duration;
        self.end_time = now + f64::from(duration);
        duration
    }

    /// Expire the effect once its end time is reached. Returns true if it
    /// ended on this call.
    pub fn update(&mut self, now: f64) -> bool {
        if self.active && now >= self.end_time {
            self.active = false;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.end_time = 0.0;
        self.duration = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn the game should act on for the requested input
    pub fn apply(&self, requested: Turn) -> Turn {
        if self.active {
            requested.opposite()
        } else {
            requested
        }
    }

    /// Seconds left, 0 when inactive
    pub fn remaining(&self, now: f64) -> f32 {
        if self.active {
            (self.end_time - now).max(0.0) as f32
        } else {
            0.0
        }
    }

    /// Remaining / total, for the status gauge
    pub fn gauge_ratio(&self, now: f64) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (self.remaining(now) / self.duration).clamp(0.0, 1.0)
    }
}

/// Counts quick consecutive moves and raises the afterimage flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AfterimageTrigger {
    tuning: AfterimageTuning,
    consecutive: u32,
    last_move: Option<f64>,
    last_afterimage_move: f64,
    active: bool,
}

impl AfterimageTrigger {
    pub fn new(tuning: AfterimageTuning) -> Self {
        Self {
            tuning,
            consecutive: 0,
            last_move: None,
            last_afterimage_move: 0.0,
            active: false,
        }
    }

    /// Record a move at time `now`. Returns true if the afterimage just switched on.
    pub fn record_move(&mut self, now: f64) -> bool {
        let quick = self
            .last_move
            .is_some_and(|last| now - last <= f64::from(self.tuning.move_interval));
        self.consecutive = if quick { self.consecutive.saturating_add(1) } else { 1 };
        self.last_move = Some(now);

        let started = !self.active && self.consecutive >= self.tuning.start_step;
        if started {
            self.active = true;
        }
        if self.active {
            self.last_afterimage_move = now;
        }
        started
    }

    /// Switch off after the decay period. Returns true if it just switched off.
    pub fn update(&mut self, now: f64) -> bool {
        if self.active && now - self.last_afterimage_move >= f64::from(self.tuning.decay) {
            self.active = false;
            self.consecutive = 0;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.tuning);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

/// Slack when comparing accumulated frame time against the deadline, so
/// frame deltas that are inexact in binary still add up to a full deadline
const DEADLINE_SLACK: f64 = 1e-6;

/// Time since the last move, compared against a deadline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathTimer {
    deadline: f32,
    elapsed: f64,
}

impl DeathTimer {
    pub fn new(deadline: f32) -> Self {
        Self {
            deadline,
            elapsed: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Accumulate `dt`; true once the deadline is reached
    pub fn advance(&mut self, dt: f32) -> bool {
        let deadline = f64::from(self.deadline);
        self.elapsed += f64::from(dt.max(0.0));
        if self.elapsed + DEADLINE_SLACK >= deadline {
            self.elapsed = deadline;
            return true;
        }
        false
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Timer bar fill: 1 right after a move, 0 at the deadline
    pub fn fill(&self) -> f32 {
        (1.0 - self.elapsed / f64::from(self.deadline)).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confuse_default_duration() {
        let mut confuse = ConfuseEffect::new(15.0);
        assert_eq!(confuse.activate(0.0, 2.0), 15.0);
        assert!(confuse.is_active());
        assert_eq!(confuse.remaining(2.0), 15.0);
        assert_eq!(confuse.activate(-1.0, 2.0), 15.0);
    }

    #[test]
    fn test_confuse_inverts_turns_while_active() {
        let mut confuse = ConfuseEffect::new(15.0);
        assert_eq!(confuse.apply(Turn::Left), Turn::Left);
        confuse.activate(3.0, 0.0);
        assert_eq!(confuse.apply(Turn::Left), Turn::Right);
        assert_eq!(confuse.apply(Turn::Right), Turn::Left);
    }

    #[test]
    fn test_confuse_expiry_idempotent() {
        let mut confuse = ConfuseEffect::new(15.0);
        confuse.activate(3.0, 1.0);
        assert!(!confuse.update(3.5));
        assert!(confuse.is_active());
        assert!(confuse.update(4.0));
        assert!(!confuse.is_active());
        assert!(!confuse.update(4.0));
        assert_eq!(confuse.remaining(4.0), 0.0);
    }

    #[test]
    fn test_confuse_reactivation_replaces_end() {
        let mut confuse = ConfuseEffect::new(15.0);
        confuse.activate(2.0, 0.0);
        confuse.activate(2.0, 1.5);
        assert!(!confuse.update(2.5));
        assert!(confuse.update(3.5));
    }

    #[test]
    fn test_confuse_gauge() {
        let mut confuse = ConfuseEffect::new(10.0);
        assert_eq!(confuse.gauge_ratio(0.0), 0.0);
        confuse.activate(0.0, 0.0);
        assert_eq!(confuse.gauge_ratio(0.0), 1.0);
        assert!((confuse.gauge_ratio(5.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_effects_keep_precision_late_in_a_session() {
        let start = 10_000_000.0;
        let mut confuse = ConfuseEffect::new(15.0);
        confuse.activate(0.5, start);
        assert!(!confuse.update(start + 0.25));
        assert!((confuse.remaining(start + 0.25) - 0.25).abs() < 1e-6);
        assert!(confuse.update(start + 0.5));

        let mut trail = AfterimageTrigger::new(AfterimageTuning::default());
        trail.record_move(start);
        trail.record_move(start + 0.25);
        assert!(trail.record_move(start + 0.5));
    }

    #[test]
    fn test_afterimage_activates_on_third_quick_move() {
        let mut trail = AfterimageTrigger::new(AfterimageTuning::default());
        assert!(!trail.record_move(1.0));
        assert!(!trail.record_move(1.25));
        assert!(!trail.is_active());
        assert!(trail.record_move(1.5));
        assert!(trail.is_active());
        assert_eq!(trail.consecutive(), 3);
        // Already active: no second activation
        assert!(!trail.record_move(1.75));
    }

    #[test]
    fn test_afterimage_slow_moves_reset_count() {
        let mut trail = AfterimageTrigger::new(AfterimageTuning::default());
        trail.record_move(1.0);
        trail.record_move(1.25);
        trail.record_move(2.0);
        assert_eq!(trail.consecutive(), 1);
        assert!(!trail.is_active());
    }

    #[test]
    fn test_afterimage_decays_after_last_move() {
        let mut trail = AfterimageTrigger::new(AfterimageTuning::default());
        trail.record_move(1.0);
        trail.record_move(1.25);
        trail.record_move(1.5);
        trail.record_move(1.75);

        assert!(!trail.update(2.5));
        assert!(trail.is_active());
        assert!(trail.update(2.75));
        assert!(!trail.is_active());
        assert_eq!(trail.consecutive(), 0);
        assert!(!trail.update(2.75));
    }

    #[test]
    fn test_death_timer() {
        let mut timer = DeathTimer::new(1.0);
        assert!(!timer.advance(0.5));
        assert_eq!(timer.fill(), 0.5);
        assert!(timer.advance(0.5));
        assert_eq!(timer.fill(), 0.0);

        timer.reset();
        assert!(!timer.advance(0.99));
        assert!(!timer.advance(0.0));
        assert!(timer.advance(0.01));
    }

    #[test]
    fn test_death_timer_full_second_of_frames() {
        let mut timer = DeathTimer::new(1.0);
        let dt = crate::consts::SIM_DT;
        for _ in 0..59 {
            assert!(!timer.advance(dt));
        }
        assert!(timer.advance(dt));
        assert_eq!(timer.fill(), 0.0);
    }
}
