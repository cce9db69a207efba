//! # Dash Engine
//!
//! Headless host for Neon Dash, a side-scrolling jump game.
//!
//! This crate ties together:
//! - Configuration loading (`dash.toml`)
//! - The frame driver thread and fixed-step timing
//! - The autopilot input source and the logging HUD
//! - Run summaries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod autopilot;
mod config;
mod driver;
mod hud;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("dash=info".parse()?)
                .add_directive("dash_engine=info".parse()?)
                .add_directive("dash_gameplay=info".parse()?),
        )
        .init();

    info!("Neon Dash starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    app::run()?;

    info!("Neon Dash shutdown complete");
    Ok(())
}
