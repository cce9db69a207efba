//! Frame driver: the animation loop.
//!
//! Runs on its own thread and, per tick, polls the input source, forwards
//! jump triggers, advances the runner and presents the snapshot. Stopping the
//! handle ends scheduling and joins the thread; no tick is ever interrupted
//! half-way because ticks are synchronous.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dash_common::{DashError, DashResult};
use dash_gameplay::{InputEvent, InputFilter, RandomSource, RenderSnapshot, SharedRunner};
use tracing::{debug, info};

use crate::timing::FrameTiming;

/// Back-off between ticks that did not advance (waiting for a reset).
const IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Receives the authoritative state after every tick. Draws only.
pub trait FrameSink: Send {
    /// Presents one post-tick snapshot.
    fn present(&mut self, snapshot: &RenderSnapshot);
}

/// Produces raw input for the next tick.
pub trait InputSource: Send {
    /// Returns input gathered since the last poll. `last` is the latest presented state.
    fn poll(&mut self, last: &RenderSnapshot) -> Vec<InputEvent>;
}

/// Input source that never presses anything.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _last: &RenderSnapshot) -> Vec<InputEvent> {
        Vec::new()
    }
}

/// Pacing and limits for the driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    /// Pace against the wall clock
    pub realtime: bool,
    /// Frames per second when realtime
    pub target_fps: u32,
    /// Ticks per second when realtime
    pub tick_rate: u32,
    /// Stop after this many advancing ticks (0 = unlimited)
    pub max_ticks: u64,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            realtime: true,
            target_fps: 60,
            tick_rate: 60,
            max_ticks: 0,
        }
    }
}

/// Counters reported when the driver stops.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverStats {
    /// Loop iterations
    pub frames: u64,
    /// Ticks that advanced the simulation
    pub ticks: u64,
    /// Jump triggers that passed the input filter
    pub jumps: u64,
    /// Average frame rate (realtime only)
    pub average_fps: f32,
}

/// Spawns the animation loop.
pub struct FrameDriver;

impl FrameDriver {
    /// Starts ticking `runner` on a new thread.
    pub fn spawn<R>(
        runner: SharedRunner<R>,
        filter: InputFilter,
        mut input: Box<dyn InputSource>,
        mut sink: Box<dyn FrameSink>,
        options: DriverOptions,
    ) -> DashResult<DriverHandle>
    where
        R: RandomSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("dash-driver".into())
            .spawn(move || {
                let mut timing = FrameTiming::new(options.target_fps, options.tick_rate);
                let mut stats = DriverStats::default();
                let mut last = runner.snapshot();
                info!(
                    realtime = options.realtime,
                    fps = options.target_fps,
                    tick_ms = timing.tick_period().as_secs_f32() * 1000.0,
                    "frame driver started"
                );
                timing.restart();

                while !stop_flag.load(Ordering::Acquire) {
                    let steps = if options.realtime {
                        timing.begin_frame()
                    } else {
                        1
                    };

                    let mut idle = true;
                    for _ in 0..steps {
                        for event in input.poll(&last) {
                            if runner.handle_input(&filter, &event).is_some() {
                                stats.jumps += 1;
                            }
                        }

                        let (outcome, snapshot) = runner.tick();
                        sink.present(&snapshot);
                        last = snapshot;

                        if outcome.advanced {
                            idle = false;
                            stats.ticks += 1;
                        }
                        if options.max_ticks > 0 && stats.ticks >= options.max_ticks {
                            debug!(ticks = stats.ticks, "tick limit reached");
                            stop_flag.store(true, Ordering::Release);
                            break;
                        }
                    }
                    stats.frames += 1;

                    if options.realtime {
                        timing.sleep_remainder();
                    } else if idle {
                        thread::sleep(IDLE_BACKOFF);
                    }
                }

                stats.average_fps = timing.average_fps();
                info!(frames = stats.frames, ticks = stats.ticks, "frame driver stopped");
                stats
            })
            .map_err(|e| DashError::Driver(format!("failed to spawn driver thread: {e}")))?;

        Ok(DriverHandle {
            stop,
            thread: Some(thread),
        })
    }
}

/// Owner of a running driver. Dropping it stops the loop.
pub struct DriverHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<DriverStats>>,
}

impl DriverHandle {
    /// Whether the loop has exited on its own (tick limit).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops scheduling ticks and waits for the loop to exit.
    pub fn stop(mut self) -> DashResult<DriverStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> DashResult<DriverStats> {
        self.stop.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| DashError::Driver("driver thread panicked".into())),
            None => Ok(DriverStats::default()),
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for DriverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverHandle")
            .field("stopping", &self.stop.load(Ordering::Acquire))
            .field("finished", &self.is_finished())
            .finish()
    }
}
