//! Stair ring: a fixed-capacity circular arena of stair slots
//!
//! The staircase is endless, but only `N` slots ever exist. Once the player
//! has passed a slot it is respawned in place: repositioned one step after
//! the previous slot in ring order, given a fresh kind, and its timers reset.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fade::FadeCycle;
use crate::tuning::{FadeTiming, SpecialChances, Tuning};
use crate::{stair_origin, step_offset};

/// Out of 5: a direction change happens when the draw is below this (2/5)
const TURN_FLIP_ROLLS: u32 = 2;
const TURN_ROLL_RANGE: u32 = 5;

/// Horizontal direction of a move or of the step leading onto a stair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Turn {
    Left,
    #[default]
    Right,
}

impl Turn {
    pub fn opposite(self) -> Self {
        match self {
            Turn::Left => Turn::Right,
            Turn::Right => Turn::Left,
        }
    }

    pub fn is_left(self) -> bool {
        self == Turn::Left
    }

    /// Diagonal world offset of one step in this direction
    pub fn offset(self) -> Vec2 {
        step_offset(self.is_left())
    }
}

/// Stair types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StairKind {
    #[default]
    Normal,
    /// Fades in and out on a cycle; the player must remember where it is
    MemoryDisappear,
    /// Landing on it reverses the controls for a while
    ConfuseControl,
}

impl StairKind {
    /// Pick a kind from a single uniform draw in [0, 1).
    ///
    /// Confuse is checked first and memory takes the adjacent range, so the
    /// two chances partition one draw instead of being independent rolls.
    pub fn from_roll(roll: f32, chances: &SpecialChances) -> Self {
        if roll < chances.confuse {
            StairKind::ConfuseControl
        } else if roll < chances.confuse + chances.memory {
            StairKind::MemoryDisappear
        } else {
            StairKind::Normal
        }
    }
}

/// One slot of the ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StairSlot {
    /// Ring index (0..N)
    pub index: usize,
    pub position: Vec2,
    /// Turn the player must make to step onto this stair
    pub turn: Turn,
    pub kind: StairKind,
    /// Only advances for memory stairs
    pub fade: FadeCycle,
}

impl StairSlot {
    fn new(index: usize) -> Self {
        Self {
            index,
            position: Vec2::ZERO,
            turn: Turn::Right,
            kind: StairKind::Normal,
            fade: FadeCycle::new(),
        }
    }

    fn set_kind(&mut self, kind: StairKind) {
        self.kind = kind;
        self.fade.reset();
    }
}

/// What the renderer needs to draw a stair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotVisual {
    pub index: usize,
    pub kind: StairKind,
    pub position: Vec2,
    pub opacity: f32,
}

/// Circular buffer of stair slots
#[derive(Debug, Clone)]
pub struct StairRing {
    slots: Vec<StairSlot>,
    /// Direction the generator is currently walking in
    direction: Turn,
    rng: Pcg32,
    chances: SpecialChances,
    fade_timing: FadeTiming,
    /// Total respawns since the last layout
    respawns: u64,
}

impl StairRing {
    /// Create and lay out a ring of `count` slots
    pub fn new(count: usize, tuning: &Tuning, seed: u64) -> Self {
        let mut ring = Self::empty(tuning, seed);
        ring.initialize(count);
        ring
    }

    /// Create a ring from an explicit turn sequence; every stair is normal
    pub fn from_turns(turns: &[Turn], tuning: &Tuning, seed: u64) -> Self {
        let mut ring = Self::empty(tuning, seed);
        let mut prev = stair_origin();
        for (i, &turn) in turns.iter().enumerate() {
            let mut slot = StairSlot::new(i);
            slot.turn = turn;
            slot.position = if i == 0 { stair_origin() } else { prev + turn.offset() };
            prev = slot.position;
            ring.slots.push(slot);
        }
        ring.direction = turns.last().copied().unwrap_or_default();
        ring
    }

    fn empty(tuning: &Tuning, seed: u64) -> Self {
        Self {
            slots: Vec::new(),
            direction: Turn::Right,
            rng: Pcg32::seed_from_u64(seed),
            chances: tuning.special_chances(),
            fade_timing: tuning.fade,
            respawns: 0,
        }
    }

    /// Lay out all slots from the origin, discarding the previous layout
    pub fn initialize(&mut self, count: usize) {
        self.slots.clear();
        self.direction = Turn::Right;
        self.respawns = 0;

        let mut prev = stair_origin();
        for i in 0..count {
            let mut slot = StairSlot::new(i);
            if i == 0 {
                slot.position = stair_origin();
                slot.turn = Turn::Right;
            } else {
                slot.position = prev + self.direction.offset();
                slot.turn = self.direction;
            }
            prev = slot.position;

            // No direction change after the last stair
            if i != 0 {
                let flip = self.roll_flip();
                if flip && i < count - 1 {
                    self.direction = self.direction.opposite();
                }
            }

            let kind = self.roll_kind();
            slot.set_kind(kind);
            self.slots.push(slot);
        }

        log::debug!("Laid out stair ring with {} slots", count);
    }

    /// Reseed the generator (used on restart)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Recycle a passed slot to one step after its predecessor in ring order.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn respawn(&mut self, index: usize) {
        let len = self.slots.len();
        assert!(index < len, "stair index {index} out of range for ring of {len}");

        if self.roll_flip() {
            self.direction = self.direction.opposite();
        }
        let prev = self.slots[(index + len - 1) % len].position;
        let direction = self.direction;
        let kind = self.roll_kind();

        let slot = &mut self.slots[index];
        slot.position = prev + direction.offset();
        slot.turn = direction;
        slot.set_kind(kind);
        self.respawns += 1;

        log::debug!(
            "Respawned stair {} at ({:.2}, {:.2}) as {:?}",
            index,
            slot.position.x,
            slot.position.y,
            kind
        );
    }

    /// Advance memory stair fade cycles
    pub fn advance(&mut self, dt: f32) {
        let timing = self.fade_timing;
        for slot in &mut self.slots {
            if slot.kind == StairKind::MemoryDisappear {
                slot.fade.advance(dt, &timing);
            }
        }
    }

    /// # Panics
    /// Panics if `index` is out of range.
    pub fn slot(&self, index: usize) -> &StairSlot {
        &self.slots[index]
    }

    pub fn get(&self, index: usize) -> Option<&StairSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[StairSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn respawn_count(&self) -> u64 {
        self.respawns
    }

    /// Render state of one slot
    pub fn visual(&self, index: usize) -> Option<SlotVisual> {
        self.slots.get(index).map(|slot| SlotVisual {
            index: slot.index,
            kind: slot.kind,
            position: slot.position,
            opacity: match slot.kind {
                StairKind::MemoryDisappear => slot.fade.opacity(&self.fade_timing),
                _ => 1.0,
            },
        })
    }

    pub fn visuals(&self) -> Vec<SlotVisual> {
        (0..self.slots.len()).filter_map(|i| self.visual(i)).collect()
    }

    fn roll_flip(&mut self) -> bool {
        self.rng.random_range(0..TURN_ROLL_RANGE) < TURN_FLIP_ROLLS
    }

    fn roll_kind(&mut self) -> StairKind {
        let roll: f32 = self.rng.random();
        StairKind::from_roll(roll, &self.chances)
    }
}
