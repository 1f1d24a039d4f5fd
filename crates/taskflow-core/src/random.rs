use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of random boolean draws.
pub trait RandomSource: Send + Sync {
    /// Returns `true` with probability `p`. Values outside `[0, 1]` are clamped.
    fn chance(&self, p: f64) -> bool;
}

/// Draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn chance(&self, p: f64) -> bool {
        rand::thread_rng().gen_bool(clamp(p))
    }
}

/// Reproducible draws from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn chance(&self, p: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(clamp(p))
    }
}

#[inline]
fn clamp(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
