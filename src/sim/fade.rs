//! Memory stair fade cycle
//!
//! A repeating four phase opacity oscillator:
//! visible -> fade out -> hidden -> fade in -> (wrap to visible).
//! Purely presentational; collision and turn validation ignore it.

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::FadeTiming;

/// Which part of the cycle a memory stair is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadePhase {
    Visible,
    FadingOut,
    Hidden,
    FadingIn,
}

/// Elapsed time within the fade cycle of one stair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FadeCycle {
    elapsed: f32,
}

impl FadeCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds into the current cycle
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Restart from fully visible
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance the cycle, wrapping at the summed phase length
    pub fn advance(&mut self, dt: f32, timing: &FadeTiming) {
        let period = timing.period();
        if period <= 0.0 {
            self.elapsed = 0.0;
            return;
        }
        self.elapsed = (self.elapsed + dt.max(0.0)) % period;
    }

    /// Current opacity (1 = opaque, 0 = invisible)
    pub fn opacity(&self, timing: &FadeTiming) -> f32 {
        opacity_at(self.elapsed, timing)
    }

    pub fn phase(&self, timing: &FadeTiming) -> FadePhase {
        phase_at(self.elapsed, timing)
    }
}

/// Phase containing time `t` (phase boundaries belong to the earlier phase)
pub fn phase_at(t: f32, timing: &FadeTiming) -> FadePhase {
    let visible_end = timing.visible;
    let fade_out_end = visible_end + timing.fade_out;
    let hidden_end = fade_out_end + timing.hidden;

    if t <= visible_end {
        FadePhase::Visible
    } else if t <= fade_out_end {
        FadePhase::FadingOut
    } else if t <= hidden_end {
        FadePhase::Hidden
    } else {
        FadePhase::FadingIn
    }
}

/// Opacity at time `t` into the cycle
pub fn opacity_at(t: f32, timing: &FadeTiming) -> f32 {
    let fade_out_start = timing.visible;
    let fade_in_start = timing.visible + timing.fade_out + timing.hidden;

    match phase_at(t, timing) {
        FadePhase::Visible => 1.0,
        FadePhase::FadingOut => lerp(1.0, 0.0, ratio(t - fade_out_start, timing.fade_out)),
        FadePhase::Hidden => 0.0,
        FadePhase::FadingIn => lerp(0.0, 1.0, ratio(t - fade_in_start, timing.fade_in)),
    }
}

fn ratio(part: f32, whole: f32) -> f32 {
    if whole > 0.0 { part / whole } else { 1.0 }
}
