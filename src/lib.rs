//! Endless Stairs - simulation core of a zig-zag stair climbing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (stair ring, player state machine, timed effects)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors reported at session setup

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, Result};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Horizontal step between two consecutive stairs
    pub const STEP_X: f32 = 0.75;
    /// Vertical rise between two consecutive stairs
    pub const STEP_Y: f32 = 0.5;

    /// World position of the first stair
    pub const STAIR_ORIGIN_X: f32 = 0.75;
    pub const STAIR_ORIGIN_Y: f32 = -0.1;

    /// Default number of stairs in the ring
    pub const DEFAULT_RING_SIZE: usize = 20;

    /// Position delta under which the player counts as standing still
    pub const SETTLE_EPSILON: f32 = 0.001;
}

/// Diagonal offset for one stair step in the given horizontal direction
#[inline]
pub fn step_offset(left: bool) -> Vec2 {
    if left {
        Vec2::new(-consts::STEP_X, consts::STEP_Y)
    } else {
        Vec2::new(consts::STEP_X, consts::STEP_Y)
    }
}

/// Position of the first stair
#[inline]
pub fn stair_origin() -> Vec2 {
    Vec2::new(consts::STAIR_ORIGIN_X, consts::STAIR_ORIGIN_Y)
}

/// Linear interpolation between `a` and `b`, with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
