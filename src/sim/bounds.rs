//! Axis-aligned bounding boxes supplied by the host physics
//!
//! The core never simulates physics itself. It only reads the boxes and
//! velocities the host reports for the player and the stairs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given full size centered on `center`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Signed width of the horizontal overlap (negative when apart)
    pub fn horizontal_overlap(&self, other: &Aabb) -> f32 {
        self.max.x.min(other.max.x) - self.min.x.max(other.min.x)
    }

    /// Move the box by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// A moving body as reported by the host: its box and velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub bounds: Aabb,
    pub velocity: Vec2,
}

impl Body {
    pub fn new(bounds: Aabb, velocity: Vec2) -> Self {
        Self { bounds, velocity }
    }

    /// Reference point used for settle detection
    pub fn position(&self) -> Vec2 {
        self.bounds.center()
    }
}

/// Collision queries the landing monitors need from the host
pub trait ContactGeometry {
    /// Current player body, if the player has one this frame
    fn player_body(&self) -> Option<Body>;

    /// Current box of the stair in ring slot `slot`
    fn stair_bounds(&self, slot: usize) -> Option<Aabb>;
}

/// Geometry for a host with nothing to report (no contacts tracked)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl ContactGeometry for NoGeometry {
    fn player_body(&self) -> Option<Body> {
        None
    }

    fn stair_bounds(&self, _slot: usize) -> Option<Aabb> {
        None
    }
}
