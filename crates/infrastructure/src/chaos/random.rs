//! Random sources for chaos draws.

use std::{collections::VecDeque, fmt};

use parking_lot::Mutex;
use rand::Rng;

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Draw the next sample
    fn next_f64(&self) -> f64;
}

/// Thread-local RNG, the production source
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Always returns the same sample
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    /// Create a source returning `sample` forever
    #[must_use]
    pub const fn new(sample: f64) -> Self {
        Self(sample)
    }
}

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

/// Replays a scripted sequence of samples, then a fallback
#[derive(Debug)]
pub struct ScriptedRandom {
    samples: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    /// Create a source replaying `samples`, then returning `fallback`
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            fallback,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        self.samples.lock().pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..1_000 {
            let sample = source.next_f64();
            assert!((0.0..1.0).contains(&sample));
        }
    }

    #[test]
    fn fixed_random_repeats() {
        let source = FixedRandom::new(0.25);
        assert!((source.next_f64() - 0.25).abs() < f64::EPSILON);
        assert!((source.next_f64() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn scripted_random_replays_then_falls_back() {
        let source = ScriptedRandom::new([0.0, 0.5], 0.99);
        assert!((source.next_f64() - 0.0).abs() < f64::EPSILON);
        assert!((source.next_f64() - 0.5).abs() < f64::EPSILON);
        assert!((source.next_f64() - 0.99).abs() < f64::EPSILON);
    }
}
