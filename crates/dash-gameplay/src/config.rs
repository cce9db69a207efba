//! Runner tuning constants.
//!
//! All physics values are expressed per tick, not per second: the runner
//! advances by one fixed step per `tick()` and never sees a delta time.

use dash_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Fixed constants driving one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    // === Player kinematics ===
    /// Velocity added each airborne tick (negative pulls down)
    pub gravity: f32,
    /// Vertical velocity applied by a jump
    pub jump_force: f32,
    /// Height of the floor surface
    pub floor_y: f32,
    /// Half the player cube's height; the player rests at `floor_y + player_half_height`
    pub player_half_height: f32,
    /// Fixed lane offset of the player on the x axis
    pub player_x: f32,
    /// Rotation interpolation factor toward the nearest quarter-turn while grounded
    pub landing_damping: f32,
    /// Radians of spin subtracted per airborne tick
    pub spin_step: f32,

    // === Scrolling ===
    /// Obstacle speed at the start of a run
    pub base_speed: f32,
    /// Speed gained per retired obstacle
    pub speed_increment: f32,
    /// Speed never exceeds this
    pub max_speed: f32,

    // === Spawning ===
    /// X position where obstacles appear
    pub spawn_x: f32,
    /// The newest obstacle must be farther than this from `spawn_x` before another spawns
    pub min_spawn_gap: f32,
    /// Spawn probability per tick at score 0
    pub base_spawn_chance: f32,
    /// Spawn probability added per score point
    pub spawn_chance_per_point: f32,
    /// Optional upper bound on the spawn probability (None = grows with score)
    pub spawn_chance_cap: Option<f32>,
    /// Probability that a spawned obstacle is a block rather than a spike
    pub block_chance: f32,
    /// Obstacles with `x` below this are retired and scored
    pub despawn_x: f32,

    // === Collision ===
    /// Collision fires when `|dx|` is below this
    pub collision_threshold_x: f32,
    /// Collision fires when `|dy|` is below this
    pub collision_threshold_y: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            gravity: -0.015,
            jump_force: 0.38,
            floor_y: -2.0,
            player_half_height: 0.5,
            player_x: -5.0,
            landing_damping: 0.2,
            spin_step: 0.15,

            base_speed: 0.2,
            speed_increment: 0.001,
            max_speed: 0.5,

            spawn_x: 25.0,
            min_spawn_gap: 15.0,
            base_spawn_chance: 0.02,
            spawn_chance_per_point: 0.0001,
            spawn_chance_cap: None,
            block_chance: 0.3,
            despawn_x: -15.0,

            collision_threshold_x: 0.8,
            collision_threshold_y: 0.8,
        }
    }
}

impl RunnerConfig {
    /// Height of the player's centre when standing on the floor.
    #[must_use]
    pub fn rest_y(&self) -> f32 {
        self.floor_y + self.player_half_height
    }

    /// Spawn probability for the given score.
    #[must_use]
    pub fn spawn_chance(&self, score: u32) -> f32 {
        let chance = self.base_spawn_chance + score as f32 * self.spawn_chance_per_point;
        match self.spawn_chance_cap {
            Some(cap) => chance.min(cap),
            None => chance,
        }
    }

    /// Checks that the constants describe a playable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gravity < 0.0) {
            return Err(ConfigError::invalid("gravity", "must be negative"));
        }
        if !(self.jump_force > 0.0) {
            return Err(ConfigError::invalid("jump_force", "must be positive"));
        }
        if self.player_half_height < 0.0 {
            return Err(ConfigError::invalid(
                "player_half_height",
                "must not be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.landing_damping) {
            return Err(ConfigError::invalid(
                "landing_damping",
                "must be within [0, 1]",
            ));
        }
        if self.base_speed < 0.0 || self.speed_increment < 0.0 {
            return Err(ConfigError::invalid(
                "base_speed",
                "speed and its increment must not be negative",
            ));
        }
        if self.max_speed < self.base_speed {
            return Err(ConfigError::invalid(
                "max_speed",
                format!(
                    "{} is below base_speed {}",
                    self.max_speed, self.base_speed
                ),
            ));
        }
        if self.despawn_x >= self.spawn_x {
            return Err(ConfigError::invalid(
                "despawn_x",
                "must lie behind spawn_x",
            ));
        }
        if self.min_spawn_gap < 0.0 {
            return Err(ConfigError::invalid("min_spawn_gap", "must not be negative"));
        }
        for (field, p) in [
            ("base_spawn_chance", self.base_spawn_chance),
            ("block_chance", self.block_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(field, "must be a probability in [0, 1]"));
            }
        }
        if self.spawn_chance_per_point < 0.0 {
            return Err(ConfigError::invalid(
                "spawn_chance_per_point",
                "must not be negative",
            ));
        }
        if let Some(cap) = self.spawn_chance_cap {
            if !(0.0..=1.0).contains(&cap) {
                return Err(ConfigError::invalid(
                    "spawn_chance_cap",
                    "must be a probability in [0, 1]",
                ));
            }
        }
        if self.collision_threshold_x < 0.0 || self.collision_threshold_y < 0.0 {
            return Err(ConfigError::invalid(
                "collision_threshold",
                "thresholds must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunnerConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.rest_y() - -1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_spawn_chance_grows_with_score() {
        let config = RunnerConfig::default();
        assert!((config.spawn_chance(0) - 0.02).abs() < 1e-6);
        assert!((config.spawn_chance(100) - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_chance_cap() {
        let config = RunnerConfig {
            spawn_chance_cap: Some(0.05),
            ..RunnerConfig::default()
        };
        assert!((config.spawn_chance(10_000) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_upward_gravity() {
        let config = RunnerConfig {
            gravity: 0.01,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "gravity", .. })
        ));
    }

    #[test]
    fn test_rejects_max_speed_below_base() {
        let config = RunnerConfig {
            max_speed: 0.1,
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = RunnerConfig {
            block_chance: 1.5,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "block_chance",
                ..
            })
        ));
    }
}
