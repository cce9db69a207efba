//! Run lifecycle and scoring.

use serde::{Deserialize, Serialize};

/// Coarse lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RunPhase {
    /// Waiting for the first jump or an explicit start.
    #[default]
    NotStarted,
    /// Simulation advancing every tick.
    Running,
    /// Hit an obstacle. Terminal until reset.
    Crashed,
}

impl RunPhase {
    /// Check if ticks advance the simulation.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Overlay text shown by the host for this phase.
    #[must_use]
    pub const fn banner(&self) -> &'static str {
        match self {
            Self::NotStarted => "Click or Space to Jump",
            Self::Running => "",
            Self::Crashed => "CRASHED",
        }
    }
}

/// Score, speed and phase of the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    score: u32,
    speed: f32,
    phase: RunPhase,
}

impl RunState {
    /// Creates a fresh state that has not started yet.
    #[must_use]
    pub const fn new(base_speed: f32) -> Self {
        Self {
            score: 0,
            speed: base_speed,
            phase: RunPhase::NotStarted,
        }
    }

    /// Returns the number of obstacles cleared.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Returns the current scroll speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// `NotStarted -> Running`. Returns whether the phase changed.
    pub fn start(&mut self) -> bool {
        if self.phase == RunPhase::NotStarted {
            self.phase = RunPhase::Running;
            true
        } else {
            false
        }
    }

    /// `Running -> Crashed`. Returns whether the phase changed.
    pub fn crash(&mut self) -> bool {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Crashed;
            true
        } else {
            false
        }
    }

    /// Credits one cleared obstacle and speeds up, clamped at `max_speed`.
    pub fn record_clear(&mut self, speed_increment: f32, max_speed: f32) {
        self.score = self.score.saturating_add(1);
        self.speed = (self.speed + speed_increment).min(max_speed).max(self.speed);
    }

    /// Reinitialises the numbers and enters `Running`.
    pub fn restart(&mut self, base_speed: f32) {
        self.score = 0;
        self.speed = base_speed;
        self.phase = RunPhase::Running;
    }
}
