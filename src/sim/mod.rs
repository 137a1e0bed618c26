//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through host-supplied deltas
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod bounds;
pub mod effects;
pub mod fade;
pub mod landing;
pub mod player;
pub mod stairs;
pub mod state;
pub mod tick;

pub use bounds::{Aabb, Body, ContactGeometry, NoGeometry};
pub use effects::{AfterimageTrigger, ConfuseEffect, DeathTimer};
pub use fade::{FadeCycle, FadePhase};
pub use landing::{LandingMonitor, LandingStatus};
pub use player::{DeathCause, MoveOutcome, PlayerPhase, PlayerStateMachine};
pub use stairs::{SlotVisual, StairKind, StairRing, StairSlot, Turn};
pub use state::{GameEvent, GameOverReport, GameSession};
pub use tick::{TickInput, tick};
