//! # Dash Gameplay
//!
//! Simulation core of Neon Dash, a side-scrolling jump game.
//!
//! This crate provides:
//! - The runner loop (fixed-step physics, spawning, collision, scoring)
//! - Player body kinematics
//! - Obstacles and the threshold collision test
//! - Run lifecycle (`NotStarted -> Running -> Crashed`)
//! - Injectable random sources for reproducible runs
//! - Input filtering for jump triggers
//! - Render snapshots and run events for hosts
//! - A mutex-guarded handle for multi-threaded hosts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod collision;
pub mod config;
pub mod events;
pub mod input;
pub mod obstacle;
pub mod player;
pub mod rng;
pub mod runner;
pub mod shared;
pub mod snapshot;
pub mod state;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::obstacle::*;
    pub use crate::player::*;
    pub use crate::rng::*;
    pub use crate::runner::*;
    pub use crate::shared::*;
    pub use crate::snapshot::*;
    pub use crate::state::*;
}

pub use prelude::*;
