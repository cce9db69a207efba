//! Engine configuration.
//!
//! Host settings (frame pacing, run count, autopilot, output) plus the runner
//! tuning. Loaded from `dash.toml`; a missing or broken file falls back to
//! defaults with a warning.

use dash_common::{DashError, DashResult, SchemaVersion};
use dash_gameplay::{InputFilter, KeyCode, RunnerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "dash.toml";

/// Environment variable overriding the config file location.
const CONFIG_ENV: &str = "DASH_CONFIG";

/// Engine configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Loop Settings ===
    /// Pace frames against the wall clock (false = tick as fast as possible)
    pub realtime: bool,
    /// Frames per second when realtime
    pub target_fps: u32,
    /// Runner ticks per second when realtime
    pub tick_rate: u32,
    /// Stop after this many simulated ticks across all runs (0 = unlimited)
    pub max_ticks: u64,

    // === Run Settings ===
    /// Spawn seed (None = random)
    pub seed: Option<u64>,
    /// Number of runs to play before exiting
    pub runs: u32,
    /// Restart automatically after a crash
    pub auto_retry: bool,

    // === Input Settings ===
    /// Let the built-in autopilot press jump
    pub autopilot: bool,
    /// Autopilot jumps when the next obstacle is this many ticks away
    pub autopilot_lead_ticks: f32,
    /// Chance the autopilot ignores an obstacle (0.0 - 1.0)
    pub autopilot_miss_chance: f32,
    /// Keys that trigger a jump
    pub jump_keys: Vec<KeyCode>,

    // === Output Settings ===
    /// Log a HUD line every this many ticks (0 = never)
    pub hud_interval: u64,
    /// Write a JSON run summary here on exit
    pub summary_path: Option<PathBuf>,

    /// Config file format version
    pub version: SchemaVersion,
    /// Runner tuning
    pub runner: RunnerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Loop
            realtime: true,
            target_fps: 60,
            tick_rate: 60,
            max_ticks: 0,

            // Runs
            seed: None,
            runs: 3,
            auto_retry: true,

            // Input
            autopilot: true,
            autopilot_lead_ticks: 20.0,
            autopilot_miss_chance: 0.05,
            jump_keys: vec![KeyCode::Space, KeyCode::ArrowUp],

            // Output
            hud_interval: 120,
            summary_path: None,

            version: SchemaVersion::CONFIG,
            runner: RunnerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load and check configuration, reporting every failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| DashError::Serialization(e.to_string()))?;

        if !SchemaVersion::CONFIG.is_compatible_with(&config.version) {
            return Err(DashError::VersionMismatch {
                expected: SchemaVersion::CONFIG.to_string(),
                actual: config.version.to_string(),
            });
        }

        config.validate();
        config.runner.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> DashResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| DashError::Serialization(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }

        dirs_config_path()
            .map(|dir| dir.join("dash").join(CONFIG_FILE))
            .unwrap_or(local)
    }

    /// Clamp host values to sensible ranges.
    pub fn validate(&mut self) {
        self.target_fps = self.target_fps.clamp(1, 240);
        self.tick_rate = self.tick_rate.clamp(1, 240);
        self.runs = self.runs.max(1);
        self.autopilot_lead_ticks = self.autopilot_lead_ticks.clamp(1.0, 120.0);
        self.autopilot_miss_chance = self.autopilot_miss_chance.clamp(0.0, 1.0);
        if self.jump_keys.is_empty() {
            self.jump_keys = vec![KeyCode::Space];
        }
    }

    /// Build the jump trigger filter from the configured keys.
    #[must_use]
    pub fn input_filter(&self) -> InputFilter {
        InputFilter::with_keys(self.jump_keys.clone())
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}
