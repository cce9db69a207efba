//! ID types for obstacles.

use serde::{Deserialize, Serialize};

/// Identifier of an obstacle within one runner.
///
/// IDs are handed out by an [`ObstacleIdAllocator`] owned by the runner, so two
/// runners seeded identically produce identical IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObstacleId(u64);

impl ObstacleId {
    /// Creates an obstacle ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

}

impl std::fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obstacle#{}", self.0)
    }
}

/// Monotonic allocator for [`ObstacleId`]s.
#[derive(Debug, Clone)]
pub struct ObstacleIdAllocator {
    next: u64,
}

impl Default for ObstacleIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleIdAllocator {
    /// Creates an allocator starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next unused ID.
    pub fn next_id(&mut self) -> ObstacleId {
        let id = ObstacleId(self.next);
        self.next += 1;
        id
    }
}
