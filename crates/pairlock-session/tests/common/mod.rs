//! Shared test environment: manual clock and seeded randomness.

#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use pairlock_session::Environment;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Clock only moves when `advance` is called. Each `rng()` call gets the
/// next seed so generators never repeat within one environment.
#[derive(Clone)]
pub struct TestEnv {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
    next_seed: Arc<AtomicU64>,
}

impl TestEnv {
    #[allow(clippy::disallowed_methods)]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
            next_seed: Arc::new(AtomicU64::new(seed)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Environment for TestEnv {
    type Instant = Instant;
    type Rng = ChaCha20Rng;

    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    fn rng(&self) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(self.next_seed.fetch_add(1, Ordering::Relaxed))
    }
}
