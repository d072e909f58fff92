//! Rng - injected random source
//!
//! Everything random in the simulation (raft jitter, steering scan order and
//! tolerance, spawn jitter, respawn placement) draws from one seeded
//! generator, so a fixed seed reproduces an entire race.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seeded uniform source shared by the compiler, the steering controllers,
/// and the orchestrator
#[derive(Debug, Clone)]
pub struct RaceRng {
    inner: Pcg32,
}

impl RaceRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform sample in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform sample in [lo, hi)
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Fair coin, used for left-first/right-first scan order
    pub fn coin(&mut self) -> bool {
        self.next_f32() < 0.5
    }
}
