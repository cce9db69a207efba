//! Random sources for spawn decisions.
//!
//! The runner draws uniform `[0, 1)` values through [`RandomSource`] so that
//! seeded runs replay exactly and tests can script every draw.

/// Uniform `[0, 1)` generator consumed by the runner.
pub trait RandomSource {
    /// Returns the next value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;
}

/// Simple LCG random number generator for deterministic spawning.
#[derive(Debug, Clone)]
pub struct SpawnRng {
    state: u64,
}

impl SpawnRng {
    /// Create a new RNG with seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Get next random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }
}

impl RandomSource for SpawnRng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly, keeping the result below 1.0.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f32(&mut self) -> f32 {
        self.f32()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    /// Creates a sequence source. An empty sequence always yields `0.0`.
    #[must_use]
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}
