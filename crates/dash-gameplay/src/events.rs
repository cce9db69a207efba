//! Run events published for hosts (score display, overlays, logging).

use crossbeam_channel::{bounded, Receiver, Sender};
use dash_common::ObstacleId;
use serde::{Deserialize, Serialize};

use crate::obstacle::ObstacleKind;

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    /// Phase left `NotStarted`
    RunStarted,
    /// Player left the floor
    Jumped,
    /// Player touched down after a jump
    Landed,
    /// Obstacle entered at the spawn point
    ObstacleSpawned {
        /// Obstacle ID
        id: ObstacleId,
        /// Obstacle shape
        kind: ObstacleKind,
    },
    /// Obstacle scrolled off screen and was removed
    ObstacleRetired {
        /// Obstacle ID
        id: ObstacleId,
    },
    /// Score changed
    ScoreChanged {
        /// New score
        score: u32,
        /// Speed after the clear
        speed: f32,
    },
    /// Player hit an obstacle
    Crashed {
        /// Obstacle that was hit
        obstacle: ObstacleId,
        /// Score after the crashing tick
        score: u32,
    },
    /// Run restarted from scratch
    Reset,
}

/// Event bus for broadcasting run events to the host.
///
/// Lossy: events published while the bus is full are dropped. Run state is
/// authoritative for phase and score.
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<RunEvent>,
    /// Receiver for collecting events
    receiver: Receiver<RunEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: RunEvent) {
        // Non-blocking send - if full, event is dropped
        if self.sender.try_send(event).is_err() {
            tracing::trace!("event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<RunEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a receiver handle for consuming events on another thread.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<RunEvent> {
        self.receiver.clone()
    }
}
