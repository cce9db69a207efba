//! Wall-clock pacing for the frame driver.
//!
//! The runner has no notion of time: one `tick()` is one step. `FrameTiming`
//! turns elapsed wall time into a count of runner ticks owed this frame, and
//! sleeps off whatever is left of the frame budget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Most ticks owed in one frame. Anything beyond is forgiven.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Longest frame counted towards owed ticks (a debugger pause, a suspended laptop).
const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Frames kept for the FPS average.
const FPS_WINDOW: usize = 120;

/// Tick debt and frame-rate bookkeeping for the driver thread.
#[derive(Debug)]
pub struct FrameTiming {
    /// Wall time of one runner tick
    tick_period: Duration,
    /// Wall time of one frame when limiting
    frame_period: Duration,
    frame_start: Instant,
    /// Elapsed time not yet paid out as ticks
    owed: Duration,
    recent_frames: VecDeque<Duration>,
}

impl FrameTiming {
    /// Paces `tick_rate` runner ticks per second inside `target_fps` frames.
    #[must_use]
    pub fn new(target_fps: u32, tick_rate: u32) -> Self {
        Self {
            tick_period: Duration::from_secs(1) / tick_rate.max(1),
            frame_period: Duration::from_secs(1) / target_fps.max(1),
            frame_start: Instant::now(),
            owed: Duration::ZERO,
            recent_frames: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Wall time of one runner tick.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Starts a frame against the wall clock and returns the ticks owed.
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now - self.frame_start;
        self.frame_start = now;
        self.advance(elapsed)
    }

    /// Adds `elapsed` to the tick debt and pays out whole ticks.
    ///
    /// A backlog longer than two ticks after the cap is dropped, so the run
    /// slows down under load instead of jumping ahead.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let elapsed = elapsed.min(MAX_FRAME_TIME);
        if self.recent_frames.len() == FPS_WINDOW {
            self.recent_frames.pop_front();
        }
        self.recent_frames.push_back(elapsed);

        self.owed += elapsed;
        let mut ticks = 0;
        while self.owed >= self.tick_period && ticks < MAX_TICKS_PER_FRAME {
            self.owed -= self.tick_period;
            ticks += 1;
        }
        if self.owed > self.tick_period * 2 {
            self.owed = Duration::ZERO;
        }
        ticks
    }

    /// Sleeps until the current frame has used its budget.
    pub fn sleep_remainder(&self) {
        if let Some(left) = self.frame_period.checked_sub(self.frame_start.elapsed()) {
            std::thread::sleep(left);
        }
    }

    /// Frames per second over the recent window (0 before the first frame).
    #[must_use]
    pub fn average_fps(&self) -> f32 {
        let total: Duration = self.recent_frames.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.recent_frames.len() as f32 / total.as_secs_f32()
    }

    /// Forgets history and restarts the clock, e.g. after a stall outside the loop.
    pub fn restart(&mut self) {
        self.frame_start = Instant::now();
        self.owed = Duration::ZERO;
        self.recent_frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tick_period_follows_rate() {
        assert_eq!(FrameTiming::new(60, 50).tick_period(), ms(20));
        assert_eq!(FrameTiming::new(0, 0).tick_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_debt_carries_between_frames() {
        let mut timing = FrameTiming::new(60, 50);
        assert_eq!(timing.advance(ms(15)), 0);
        assert_eq!(timing.advance(ms(15)), 1);
        assert_eq!(timing.advance(ms(30)), 2);
    }

    #[test]
    fn test_long_frame_is_capped_and_forgiven() {
        let mut timing = FrameTiming::new(60, 50);
        assert_eq!(timing.advance(Duration::from_secs(5)), MAX_TICKS_PER_FRAME);
        // The remaining 50ms exceeds two ticks and is dropped
        assert_eq!(timing.advance(ms(1)), 0);
    }

    #[test]
    fn test_average_fps() {
        let mut timing = FrameTiming::new(60, 60);
        assert_eq!(timing.average_fps(), 0.0);
        for _ in 0..10 {
            timing.advance(ms(20));
        }
        assert!((timing.average_fps() - 50.0).abs() < 0.01);

        timing.restart();
        assert_eq!(timing.average_fps(), 0.0);
    }

    #[test]
    fn test_begin_frame_measures_wall_clock() {
        let mut timing = FrameTiming::new(60, 100);
        std::thread::sleep(ms(35));
        assert!(timing.begin_frame() >= 3);
    }
}
