//! Game balance tuning
//!
//! Every gameplay constant that a designer might want to adjust lives here.
//! Missing JSON fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RING_SIZE;
use crate::error::{ConfigError, Result};

/// Memory stair fade cycle durations (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeTiming {
    /// Fully visible at the start of the cycle
    pub visible: f32,
    /// Fading from opaque to transparent
    pub fade_out: f32,
    /// Fully transparent
    pub hidden: f32,
    /// Fading back in
    pub fade_in: f32,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            visible: 0.7,
            fade_out: 0.7,
            hidden: 1.5,
            fade_in: 0.7,
        }
    }
}

impl FadeTiming {
    /// Length of one full cycle
    pub fn period(&self) -> f32 {
        self.visible + self.fade_out + self.hidden + self.fade_in
    }
}

/// Afterimage trail trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterimageTuning {
    /// Consecutive quick moves needed to switch the trail on
    pub start_step: u32,
    /// Maximum gap between moves that still counts as consecutive
    pub move_interval: f32,
    /// Trail switches off this long after the last move
    pub decay: f32,
}

impl Default for AfterimageTuning {
    fn default() -> Self {
        Self {
            start_step: 3,
            move_interval: 0.3,
            decay: 1.0,
        }
    }
}

/// Settled landing detection on confuse stairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingTuning {
    /// How close the player's feet must be to the stair top
    pub stand_epsilon: f32,
    /// Horizontal overlap relative to the player width
    pub overlap_ratio: f32,
    /// Time the player must stay still before the landing counts
    pub settle_time: f32,
    /// Give up watching after this long
    pub monitor_timeout: f32,
    /// Upward speed above which the player is considered mid-jump
    pub upward_ignore_velocity: f32,
}

impl Default for LandingTuning {
    fn default() -> Self {
        Self {
            stand_epsilon: 0.05,
            overlap_ratio: 0.5,
            settle_time: 0.06,
            monitor_timeout: 1.0,
            upward_ignore_velocity: 1.0,
        }
    }
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of stair slots recycled by the ring
    pub ring_size: usize,
    /// Chance a stair becomes a confuse stair (checked first)
    pub confuse_chance: f32,
    /// Chance a stair becomes a memory stair (checked second)
    pub memory_chance: f32,
    /// Stairs start recycling once the move count exceeds this
    pub respawn_after_moves: u32,
    /// Seconds allowed between two moves
    pub move_deadline: f32,
    /// Default confuse duration when a stair requests "use default"
    pub confuse_duration: f32,
    pub fade: FadeTiming,
    pub afterimage: AfterimageTuning,
    pub landing: LandingTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            confuse_chance: 0.05,
            memory_chance: 0.10,
            respawn_after_moves: 5,
            move_deadline: 1.0,
            confuse_duration: 15.0,
            fade: FadeTiming::default(),
            afterimage: AfterimageTuning::default(),
            landing: LandingTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.ring_size == 0 {
            return Err(ConfigError::EmptyRing);
        }

        for (name, value) in [
            ("confuse_chance", self.confuse_chance),
            ("memory_chance", self.memory_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        let total = self.confuse_chance + self.memory_chance;
        if total > 1.0 {
            return Err(ConfigError::ProbabilitiesExceedOne { total });
        }

        for (name, value) in [
            ("move_deadline", self.move_deadline),
            ("confuse_duration", self.confuse_duration),
            ("fade period", self.fade.period()),
            ("afterimage.move_interval", self.afterimage.move_interval),
            ("afterimage.decay", self.afterimage.decay),
            ("landing.settle_time", self.landing.settle_time),
            ("landing.monitor_timeout", self.landing.monitor_timeout),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let ratio = self.landing.overlap_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio > 1.0 {
            return Err(ConfigError::InvalidRatio { value: ratio });
        }

        Ok(())
    }

    /// Special stair chances as used by the stair generator
    pub fn special_chances(&self) -> SpecialChances {
        SpecialChances {
            confuse: self.confuse_chance,
            memory: self.memory_chance,
        }
    }
}

/// Thresholds applied to a single uniform draw when picking a stair kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialChances {
    pub confuse: f32,
    pub memory: f32,
}
