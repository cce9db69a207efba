//! Thread-safe handle to a runner.
//!
//! `jump()` and `tick()` both read-modify-write the player and the phase, so a
//! host that delivers input on one thread and ticks on another must serialise
//! them. [`SharedRunner`] does that with a single mutex.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::events::RunEvent;
use crate::input::{InputEvent, InputFilter};
use crate::rng::{RandomSource, SpawnRng};
use crate::runner::{JumpOutcome, RunnerLoop, TickOutcome};
use crate::snapshot::RenderSnapshot;
use crate::state::RunPhase;

/// Cloneable, mutex-guarded runner.
#[derive(Debug)]
pub struct SharedRunner<R = SpawnRng> {
    inner: Arc<Mutex<RunnerLoop<R>>>,
}

impl<R> Clone for SharedRunner<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RandomSource> SharedRunner<R> {
    /// Wraps a runner.
    #[must_use]
    pub fn new(runner: RunnerLoop<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(runner)),
        }
    }

    /// Forwards a jump trigger.
    pub fn jump(&self) -> JumpOutcome {
        self.inner.lock().jump()
    }

    /// Filters a raw input event and forwards it as a jump if it qualifies.
    pub fn handle_input(&self, filter: &InputFilter, event: &InputEvent) -> Option<JumpOutcome> {
        filter.is_jump(event).then(|| self.jump())
    }

    /// Advances one step and returns the post-tick snapshot under the same lock.
    pub fn tick(&self) -> (TickOutcome, RenderSnapshot) {
        let mut runner = self.inner.lock();
        let outcome = runner.tick();
        (outcome, runner.snapshot())
    }

    /// Restarts the run.
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Leaves `NotStarted`.
    pub fn start(&self) -> bool {
        self.inner.lock().start()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.inner.lock().phase()
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        self.inner.lock().snapshot()
    }

    /// Subscribes to run events.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<RunEvent> {
        self.inner.lock().events().subscribe()
    }

    /// Runs `f` with exclusive access to the runner.
    pub fn with<T>(&self, f: impl FnOnce(&mut RunnerLoop<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
