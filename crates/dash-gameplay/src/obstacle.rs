//! Obstacles scrolling toward the player.

use dash_common::ObstacleId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Obstacle shape. Both kinds share the same collision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Four-sided cone
    Spike,
    /// Unit cube
    Block,
}

impl ObstacleKind {
    /// Picks a kind from a uniform draw: `Block` when `draw < block_chance`.
    #[must_use]
    pub fn from_draw(draw: f32, block_chance: f32) -> Self {
        if draw < block_chance {
            Self::Block
        } else {
            Self::Spike
        }
    }

    /// Stable numeric tag used in instance buffers.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Spike => 0,
            Self::Block => 1,
        }
    }
}

/// An active obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    id: ObstacleId,
    kind: ObstacleKind,
    position: Vec3,
}

impl Obstacle {
    /// Creates an obstacle resting at height `y`.
    #[must_use]
    pub const fn new(id: ObstacleId, kind: ObstacleKind, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            position: Vec3::new(x, y, 0.0),
        }
    }

    /// Returns the obstacle ID.
    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    /// Returns the obstacle kind.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Returns the centre position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the obstacle toward the player.
    pub fn advance(&mut self, speed: f32) {
        self.position.x -= speed;
    }

    /// Checks whether the obstacle has scrolled past `despawn_x`.
    #[must_use]
    pub fn is_off_screen(&self, despawn_x: f32) -> bool {
        self.position.x < despawn_x
    }
}
