//! Application host: wires config, runner, driver and output together.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::RecvTimeoutError;
use dash_gameplay::{RunPhase, RunnerLoop, SharedRunner, SpawnRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::autopilot::Autopilot;
use crate::config::EngineConfig;
use crate::driver::{DriverOptions, FrameDriver, InputSource, NoInput};
use crate::hud::HudSink;

/// How long the host waits for an event before checking the driver.
const EVENT_POLL: Duration = Duration::from_millis(100);

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 1-based run number
    pub run: u32,
    /// Obstacles cleared
    pub score: u32,
    /// Ticks simulated in this run
    pub ticks: u64,
    /// Whether the run ended in a crash (false = stopped by the host)
    pub crashed: bool,
}

/// Everything written to the summary file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Spawn seed used for every run
    pub seed: u64,
    /// Finished runs in order
    pub runs: Vec<RunSummary>,
    /// Ticks across all runs
    pub total_ticks: u64,
    /// Jump triggers accepted
    pub jumps: u64,
}

impl SessionSummary {
    /// Highest score of the session.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.runs.iter().map(|r| r.score).max().unwrap_or(0)
    }

    /// Write the summary as pretty JSON.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// What the host should do after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Keep waiting
    Continue,
    /// Reset the runner for the next run
    Retry,
    /// All runs done
    Finished,
}

/// Tracks runs from the runner's phase.
#[derive(Debug)]
pub struct Session {
    summary: SessionSummary,
    runs: u32,
    auto_retry: bool,
}

impl Session {
    /// Creates a session that plays `runs` runs.
    #[must_use]
    pub fn new(seed: u64, runs: u32, auto_retry: bool) -> Self {
        Self {
            summary: SessionSummary {
                seed,
                ..SessionSummary::default()
            },
            runs: runs.max(1),
            auto_retry,
        }
    }

    /// Number of the run currently playing.
    #[must_use]
    pub fn current_run(&self) -> u32 {
        self.summary.runs.len() as u32 + 1
    }

    /// Checks the runner state read after a tick. A crashed run is recorded
    /// once; the caller must reset the runner before checking again.
    pub fn observe(&mut self, phase: RunPhase, score: u32, ticks: u64) -> SessionStep {
        if phase != RunPhase::Crashed {
            return SessionStep::Continue;
        }

        let run = self.current_run();
        info!(run, score, ticks, "run over");
        self.summary.runs.push(RunSummary {
            run,
            score,
            ticks,
            crashed: true,
        });

        if self.auto_retry && (self.summary.runs.len() as u32) < self.runs {
            SessionStep::Retry
        } else {
            SessionStep::Finished
        }
    }

    /// Closes the session. A run still in progress is recorded as not crashed.
    #[must_use]
    pub fn finish(
        mut self,
        in_progress: Option<(u32, u64)>,
        total_ticks: u64,
        jumps: u64,
    ) -> SessionSummary {
        if let Some((score, ticks)) = in_progress {
            let run = self.current_run();
            self.summary.runs.push(RunSummary {
                run,
                score,
                ticks,
                crashed: false,
            });
        }
        self.summary.total_ticks = total_ticks;
        self.summary.jumps = jumps;
        self.summary
    }
}

/// Runs the headless game until all runs finish or the tick limit is hit.
pub fn run() -> Result<()> {
    let config_path = EngineConfig::config_path();
    let first_launch = !config_path.exists();
    let config = EngineConfig::load_from(&config_path);

    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("Configuration loaded:");
    info!("  Seed: {seed}");
    info!("  Runs: {} (auto retry: {})", config.runs, config.auto_retry);
    info!("  Realtime: {} @ {} ticks/s", config.realtime, config.tick_rate);
    info!("  Autopilot: {}", config.autopilot);

    let runner = RunnerLoop::new(config.runner.clone(), SpawnRng::new(seed))
        .context("invalid runner configuration")?;
    let shared = SharedRunner::new(runner);
    let events = shared.subscribe();

    let input: Box<dyn InputSource> = if config.autopilot {
        Box::new(Autopilot::new(
            config.autopilot_lead_ticks,
            config.autopilot_miss_chance,
            seed.rotate_left(17),
        ))
    } else {
        shared.start();
        Box::new(NoInput)
    };
    let (sink, hud) = HudSink::new(config.hud_interval);

    let options = DriverOptions {
        realtime: config.realtime,
        target_fps: config.target_fps,
        tick_rate: config.tick_rate,
        max_ticks: config.max_ticks,
    };
    let handle = FrameDriver::spawn(
        shared.clone(),
        config.input_filter(),
        input,
        Box::new(sink),
        options,
    )?;

    // Events are informational; run boundaries come from the runner itself
    let mut session = Session::new(seed, config.runs, config.auto_retry);
    loop {
        match events.recv_timeout(EVENT_POLL) {
            Ok(event) => debug!(?event, "run event"),
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => {
                warn!("event channel closed");
                break;
            },
        }

        let (phase, score, ticks) = shared.with(|r| (r.phase(), r.state().score(), r.ticks()));
        match session.observe(phase, score, ticks) {
            SessionStep::Continue => {},
            SessionStep::Retry => {
                shared.reset();
                info!(run = session.current_run(), "retrying");
            },
            SessionStep::Finished => break,
        }
        if handle.is_finished() {
            break;
        }
    }

    let stats = handle.stop()?;
    debug!(frames = stats.frames, fps = stats.average_fps, "driver stats");
    let last = shared.snapshot();
    let in_progress = last.phase.is_running().then_some((last.score, last.tick));
    let summary = session.finish(in_progress, stats.ticks, stats.jumps);

    let hud = hud.lock().clone();
    info!(
        frames = hud.frames,
        uploaded = hud.bytes_uploaded,
        "Last frame: tick {} score {} speed {:.3} ({:?})",
        hud.tick,
        hud.score,
        hud.speed,
        hud.phase
    );
    info!(
        runs = summary.runs.len(),
        best = summary.best_score(),
        ticks = summary.total_ticks,
        jumps = summary.jumps,
        "session complete"
    );
    for run in &summary.runs {
        info!("  Run {}: score {} in {} ticks", run.run, run.score, run.ticks);
    }

    if let Some(path) = &config.summary_path {
        summary.write_to(path)?;
        info!("Wrote summary to {}", path.display());
    }

    // Leave an editable config behind on first launch
    if first_launch {
        if let Err(e) = config.save_to(&config_path) {
            warn!("Failed to save config: {e}");
        }
    }

    Ok(())
}
