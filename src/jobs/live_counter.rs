use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::utils::format_utils::group_thousands;

pub const INITIAL_LISTING_COUNT: u64 = 50_247;
pub const LISTING_TICK_INTERVAL: Duration = Duration::from_secs(4);

/// Simulated "listings indexed" number in the hero, which keeps creeping up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveListingCounter {
    count: u64,
}

impl LiveListingCounter {
    pub fn new(start: u64) -> Self {
        Self { count: start }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Adds 1 to 3 listings.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> u64 {
        self.count += rng.gen_range(1..=3);
        self.count
    }

    /// Hero text, e.g. `"50,247+"`.
    pub fn display(&self) -> String {
        format!("{}+", group_thousands(self.count))
    }
}

impl Default for LiveListingCounter {
    fn default() -> Self {
        Self::new(INITIAL_LISTING_COUNT)
    }
}

/// Ticks a counter every `interval` and publishes each value.
/// The task ends once every receiver has been dropped.
pub fn spawn_live_counter(start: u64, interval: Duration) -> (watch::Receiver<u64>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(start);
    let handle = tokio::spawn(async move {
        let mut counter = LiveListingCounter::new(start);
        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick completes immediately

        loop {
            ticker.tick().await;
            let value = counter.tick(&mut rng);
            if tx.send(value).is_err() {
                tracing::debug!("Live listing counter has no viewers left, stopping at {}", value);
                break;
            }
        }
    });
    (rx, handle)
}
