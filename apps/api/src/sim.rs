//! Simulated network conditions: latency and randomized failures.
//!
//! Every randomized draw goes through one owned RNG so tests can seed
//! it or switch the whole simulation off. Handlers roll for failure
//! *before* touching the store; an injected failure must leave state
//! unchanged.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::{sleep, Duration};

/// Uniform latency applied to every response, success or failure.
const LATENCY_MS: Range<u64> = 200..1200;
/// Bernoulli failure rate for job/candidate create and update.
const WRITE_FAILURE_RATE: f64 = 0.08;
/// Bernoulli failure rate for the reorder endpoint.
const REORDER_FAILURE_RATE: f64 = 0.12;

#[derive(Clone)]
pub struct Simulation {
    latency_ms: Option<Range<u64>>,
    write_failure_rate: f64,
    reorder_failure_rate: f64,
    rng: Arc<Mutex<StdRng>>,
}

impl Simulation {
    /// Production behavior: 200-1200ms latency, 8% write failures,
    /// 12% reorder failures.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Same rates as `new`, but deterministic draws.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// No latency, no injected failures. Test configurations start
    /// here and dial individual rates back up.
    pub fn disabled() -> Self {
        Self {
            latency_ms: None,
            write_failure_rate: 0.0,
            reorder_failure_rate: 0.0,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            latency_ms: Some(LATENCY_MS),
            write_failure_rate: WRITE_FAILURE_RATE,
            reorder_failure_rate: REORDER_FAILURE_RATE,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    #[cfg(test)]
    pub fn with_rates(write_failure_rate: f64, reorder_failure_rate: f64) -> Self {
        Self {
            latency_ms: None,
            write_failure_rate,
            reorder_failure_rate,
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Sleeps for one uniformly drawn round-trip. No-op when latency
    /// simulation is off.
    pub async fn delay(&self) {
        let ms = match &self.latency_ms {
            Some(range) => self.rng.lock().unwrap().gen_range(range.clone()),
            None => return,
        };
        sleep(Duration::from_millis(ms)).await;
    }

    /// One failure trial for a job/candidate create or update.
    pub fn write_failure(&self) -> bool {
        self.roll(self.write_failure_rate)
    }

    /// One failure trial for the reorder transaction.
    pub fn reorder_failure(&self) -> bool {
        self.roll(self.reorder_failure_rate)
    }

    fn roll(&self, rate: f64) -> bool {
        self.rng.lock().unwrap().gen_bool(rate)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
