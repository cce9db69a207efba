//! Player body kinematics.
//!
//! The player never moves along x or z. Only the vertical axis is simulated;
//! rotation is cosmetic and has no effect on collision.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::config::RunnerConfig;

/// Result of integrating the player for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Stayed on the floor
    Grounded,
    /// Touched the floor this tick after being airborne
    Landed,
    /// In the air after this tick
    Airborne,
}

/// The player cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Centre of the cube
    position: Vec3,
    /// Vertical velocity per tick
    velocity_y: f32,
    /// Standing on the floor
    grounded: bool,
    /// Roll around the z axis in radians
    rotation: f32,
}

impl PlayerBody {
    /// Creates a player standing on the floor.
    #[must_use]
    pub fn at_rest(config: &RunnerConfig) -> Self {
        Self {
            position: Vec3::new(config.player_x, config.rest_y(), 0.0),
            velocity_y: 0.0,
            grounded: true,
            rotation: 0.0,
        }
    }

    /// Returns the centre position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the vertical velocity.
    #[must_use]
    pub const fn velocity_y(&self) -> f32 {
        self.velocity_y
    }

    /// Check if the player is grounded (can jump).
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Returns the cosmetic roll angle in radians.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Launches the player if grounded. Returns whether the jump happened.
    pub fn jump(&mut self, jump_force: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity_y = jump_force;
        self.grounded = false;
        true
    }

    /// Advances the vertical axis by one tick.
    pub fn integrate(&mut self, config: &RunnerConfig) -> Motion {
        let was_grounded = self.grounded;
        let rest_y = config.rest_y();

        self.position.y += self.velocity_y;

        if self.position.y <= rest_y {
            self.position.y = rest_y;
            self.velocity_y = 0.0;
            self.grounded = true;

            let target = (self.rotation / FRAC_PI_2).round() * FRAC_PI_2;
            self.rotation += (target - self.rotation) * config.landing_damping;

            if was_grounded {
                Motion::Grounded
            } else {
                Motion::Landed
            }
        } else {
            self.velocity_y += config.gravity;
            self.grounded = false;
            self.rotation -= config.spin_step;
            Motion::Airborne
        }
    }

    /// Puts the player back on the floor with no spin.
    pub fn reset(&mut self, config: &RunnerConfig) {
        *self = Self::at_rest(config);
    }
}
