//! Threshold collision test between the player and obstacles.
//!
//! This is not exact geometry: two centres collide when both axis distances
//! fall strictly below fixed thresholds. Spikes and blocks use the same box.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half-width thresholds of the collision box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBox {
    /// Maximum exclusive `|dx|`
    pub half_x: f32,
    /// Maximum exclusive `|dy|`
    pub half_y: f32,
}

impl ThresholdBox {
    /// Creates a threshold box.
    #[must_use]
    pub const fn new(half_x: f32, half_y: f32) -> Self {
        Self { half_x, half_y }
    }

    /// Checks if two centres are close enough to collide. The z axis is ignored.
    #[must_use]
    pub fn overlaps(&self, a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < self.half_x && (a.y - b.y).abs() < self.half_y
    }
}

impl Default for ThresholdBox {
    fn default() -> Self {
        Self::new(0.8, 0.8)
    }
}
