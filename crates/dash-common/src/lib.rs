//! # Dash Common
//!
//! Common types shared by the Neon Dash crates:
//! - Error taxonomy for configuration and host failures
//! - Obstacle identifiers
//! - Schema versions for config files and render snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
