//! The run's single source of randomness.
//!
//! Every stochastic decision in a run draws from one `SimRng`, in a fixed
//! call order. Reordering calls changes every later outcome for a seed, so the
//! draw order inside the simulator is part of its contract.

use rand::distr::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

#[derive(Clone, Debug)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha12Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Seed from `seed`, or draw a fresh seed when none is given.
    ///
    /// A drawn seed is still recorded (see [`SimRng::seed`]) so the run can be
    /// replayed, but two unseeded runs will not match.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => {
                let drawn = rand::random::<u64>();
                log::warn!("no seed configured; using non-deterministic seed {drawn}");
                Self::new(drawn)
            }
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, max)`.
    pub fn uniform_float(&mut self, max: f64) -> f64 {
        self.inner.random::<f64>() * max
    }

    /// Uniform integer in `[0, max)`. `max` must be positive.
    pub fn uniform_int(&mut self, max: usize) -> usize {
        debug_assert!(max > 0, "uniform_int requires max > 0");
        self.inner.random_range(0..max)
    }

    /// Bernoulli trial: true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform_float(1.0) < p
    }

    /// In-place Fisher–Yates shuffle, walking from the end towards the start.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut n = items.len();
        while n > 1 {
            n -= 1;
            let k = self.uniform_int(n + 1);
            items.swap(k, n);
        }
    }

    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.inner)
    }
}
