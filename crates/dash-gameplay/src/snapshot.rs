//! Read-only view of the simulation handed to the renderer after each tick.
//!
//! Renderers draw from a [`RenderSnapshot`] and never touch runner state.

use bytemuck::{Pod, Zeroable};
use dash_common::{ObstacleId, SchemaVersion};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::obstacle::ObstacleKind;
use crate::state::RunPhase;

/// Shape tag for the player cube in [`ShapeInstance::shape`].
pub const SHAPE_PLAYER: u32 = 2;

/// Gold player cube.
const PLAYER_COLOR: [f32; 4] = [1.0, 0.843, 0.0, 1.0];
/// Red spike.
const SPIKE_COLOR: [f32; 4] = [1.0, 0.0, 0.267, 1.0];
/// Teal block.
const BLOCK_COLOR: [f32; 4] = [0.0, 1.0, 0.8, 1.0];

/// Player pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    /// Centre position
    pub position: Vec3,
    /// Roll around z in radians
    pub rotation: f32,
    /// Standing on the floor
    pub grounded: bool,
}

/// One obstacle to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    /// Obstacle ID
    pub id: ObstacleId,
    /// Obstacle shape
    pub kind: ObstacleKind,
    /// Centre position
    pub position: Vec3,
}

/// Authoritative state after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Layout version
    pub version: SchemaVersion,
    /// Ticks simulated since the run (re)started
    pub tick: u64,
    /// Lifecycle phase
    pub phase: RunPhase,
    /// Current score
    pub score: u32,
    /// Current scroll speed
    pub speed: f32,
    /// Player pose
    pub player: PlayerPose,
    /// Active obstacles, oldest first
    pub obstacles: Vec<ObstacleView>,
}

/// GPU instance data for one drawn primitive.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ShapeInstance {
    /// World position (x, y, z)
    pub position: [f32; 3],
    /// Roll around z in radians
    pub rotation: f32,
    /// Base color (RGBA)
    pub color: [f32; 4],
    /// Shape tag: obstacle kind tag or [`SHAPE_PLAYER`]
    pub shape: u32,
    /// Padding to 16-byte alignment
    pub _padding: [u32; 3],
}

impl RenderSnapshot {
    /// Builds the instance list: the player first, then obstacles in list order.
    #[must_use]
    pub fn instances(&self) -> Vec<ShapeInstance> {
        let mut out = Vec::with_capacity(self.obstacles.len() + 1);
        out.push(ShapeInstance {
            position: self.player.position.to_array(),
            rotation: self.player.rotation,
            color: PLAYER_COLOR,
            shape: SHAPE_PLAYER,
            _padding: [0; 3],
        });
        out.extend(self.obstacles.iter().map(|obs| ShapeInstance {
            position: obs.position.to_array(),
            rotation: 0.0,
            color: match obs.kind {
                ObstacleKind::Spike => SPIKE_COLOR,
                ObstacleKind::Block => BLOCK_COLOR,
            },
            shape: obs.kind.tag(),
            _padding: [0; 3],
        }));
        out
    }

    /// Nearest obstacle still ahead of (or level with) the player.
    #[must_use]
    pub fn next_obstacle(&self) -> Option<&ObstacleView> {
        self.obstacles
            .iter()
            .filter(|obs| obs.position.x >= self.player.position.x)
            .min_by(|a, b| a.position.x.total_cmp(&b.position.x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RenderSnapshot {
        RenderSnapshot {
            version: SchemaVersion::SNAPSHOT,
            tick: 10,
            phase: RunPhase::Running,
            score: 0,
            speed: 0.2,
            player: PlayerPose {
                position: Vec3::new(-5.0, -1.5, 0.0),
                rotation: 0.0,
                grounded: true,
            },
            obstacles: vec![
                ObstacleView {
                    id: ObstacleId::from_raw(1),
                    kind: ObstacleKind::Spike,
                    position: Vec3::new(-8.0, -1.5, 0.0),
                },
                ObstacleView {
                    id: ObstacleId::from_raw(2),
                    kind: ObstacleKind::Block,
                    position: Vec3::new(3.0, -1.5, 0.0),
                },
            ],
        }
    }

    #[test]
    fn test_instances_layout() {
        let instances = snapshot().instances();
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].shape, SHAPE_PLAYER);
        assert_eq!(instances[2].shape, ObstacleKind::Block.tag());

        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 3 * std::mem::size_of::<ShapeInstance>());
        assert_eq!(std::mem::size_of::<ShapeInstance>(), 48);
    }

    #[test]
    fn test_next_obstacle_skips_passed() {
        let snap = snapshot();
        let next = snap.next_obstacle().expect("obstacle ahead");
        assert_eq!(next.id, ObstacleId::from_raw(2));
    }
}
