//! Built-in player for unattended runs.
//!
//! Presses Space to start, then jumps when the next obstacle is about
//! `lead_ticks` away at the current speed. Each obstacle gets one roll against
//! `miss_chance` so runs eventually end.

use dash_common::ObstacleId;
use dash_gameplay::{FocusTarget, InputEvent, KeyCode, RenderSnapshot, RunPhase};
use tracing::trace;

use crate::driver::InputSource;

/// Obstacle-watching input source.
#[derive(Debug)]
pub struct Autopilot {
    lead_ticks: f32,
    miss_chance: f32,
    rng: fastrand::Rng,
    /// Last obstacle a decision was made for
    decided: Option<ObstacleId>,
}

impl Autopilot {
    /// Creates an autopilot with its own seeded miss roll.
    #[must_use]
    pub fn new(lead_ticks: f32, miss_chance: f32, seed: u64) -> Self {
        Self {
            lead_ticks,
            miss_chance,
            rng: fastrand::Rng::with_seed(seed),
            decided: None,
        }
    }

    fn press() -> Vec<InputEvent> {
        vec![InputEvent::KeyDown {
            key: KeyCode::Space,
            focus: FocusTarget::GameSurface,
        }]
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, last: &RenderSnapshot) -> Vec<InputEvent> {
        match last.phase {
            RunPhase::NotStarted => return Self::press(),
            RunPhase::Crashed => {
                self.decided = None;
                return Vec::new();
            },
            RunPhase::Running => {},
        }

        if !last.player.grounded || last.speed <= 0.0 {
            return Vec::new();
        }
        let Some(next) = last.next_obstacle() else {
            return Vec::new();
        };

        let ticks_away = (next.position.x - last.player.position.x) / last.speed;
        if ticks_away > self.lead_ticks || self.decided == Some(next.id) {
            return Vec::new();
        }

        self.decided = Some(next.id);
        if self.rng.f32() < self.miss_chance {
            trace!(obstacle = %next.id, "autopilot misses");
            return Vec::new();
        }
        Self::press()
    }
}
