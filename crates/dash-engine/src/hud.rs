//! Headless renderer: turns snapshots into log lines and HUD state.

use std::sync::Arc;

use dash_gameplay::{RenderSnapshot, RunPhase};
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::driver::FrameSink;

/// Latest values shown on the HUD, shared with the host thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudState {
    /// Score display
    pub score: u32,
    /// Speed display
    pub speed: f32,
    /// Phase of the last presented frame
    pub phase: RunPhase,
    /// Tick of the last presented frame
    pub tick: u64,
    /// Frames presented
    pub frames: u64,
    /// Instance bytes that would have been uploaded to the GPU
    pub bytes_uploaded: u64,
}

/// Frame sink that logs instead of drawing.
#[derive(Debug)]
pub struct HudSink {
    state: Arc<Mutex<HudState>>,
    /// Log a HUD line every this many ticks (0 = never)
    interval: u64,
    last_phase: Option<RunPhase>,
}

impl HudSink {
    /// Creates a sink and the shared HUD state it updates.
    #[must_use]
    pub fn new(interval: u64) -> (Self, Arc<Mutex<HudState>>) {
        let state = Arc::new(Mutex::new(HudState::default()));
        let sink = Self {
            state: Arc::clone(&state),
            interval,
            last_phase: None,
        };
        (sink, state)
    }
}

impl FrameSink for HudSink {
    fn present(&mut self, snapshot: &RenderSnapshot) {
        let instances = snapshot.instances();
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        trace!(tick = snapshot.tick, instances = instances.len(), "frame");

        {
            let mut hud = self.state.lock();
            hud.score = snapshot.score;
            hud.speed = snapshot.speed;
            hud.phase = snapshot.phase;
            hud.tick = snapshot.tick;
            hud.frames += 1;
            hud.bytes_uploaded += bytes.len() as u64;
        }

        if self.last_phase != Some(snapshot.phase) {
            let banner = snapshot.phase.banner();
            if banner.is_empty() {
                info!(phase = ?snapshot.phase, "phase changed");
            } else {
                info!(phase = ?snapshot.phase, score = snapshot.score, "{banner}");
            }
            self.last_phase = Some(snapshot.phase);
        }

        if self.interval > 0
            && snapshot.phase == RunPhase::Running
            && snapshot.tick % self.interval == 0
        {
            debug!(
                tick = snapshot.tick,
                score = snapshot.score,
                speed = snapshot.speed,
                obstacles = snapshot.obstacles.len(),
                y = snapshot.player.position.y,
                "SCORE: {}",
                snapshot.score
            );
        }
    }
}
