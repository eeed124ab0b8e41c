//! Fixed-rate send throttle.

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Enforces a minimum delay between consecutive sends.
///
/// The first [`acquire`](Throttle::acquire) returns immediately; each later
/// call waits until at least `min_interval` has passed since the previous
/// one. Missed ticks are not caught up in a burst. A zero interval disables
/// the throttle.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct Throttle {
    ticker: Option<Interval>,
}

impl Throttle {
    /// Create a throttle with the given minimum delay.
    pub fn new(min_interval: Duration) -> Self {
        let ticker = (!min_interval.is_zero()).then(|| {
            let mut ticker = interval(min_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self { ticker }
    }

    /// Create a throttle that never waits.
    pub fn unlimited() -> Self {
        Self { ticker: None }
    }

    /// Waits for the next send slot.
    pub async fn acquire(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }
    }

    /// Returns true if the throttle never waits.
    pub fn is_unlimited(&self) -> bool {
        self.ticker.is_none()
    }
}
