use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

struct Pace {
    interval: Duration,
    next_slot: Instant,
}

/// Spaces out provider requests issued from any number of tasks.
///
/// Every caller reserves the next free slot and sleeps until it comes up, so
/// concurrent fetches still hit the API at most once per `interval`.
pub struct RateControl {
    min_interval: Duration,
    max_interval: Duration,
    pace: Mutex<Pace>,
}

impl RateControl {
    pub fn new(min: u64, max: u64) -> Self {
        let min_interval = Duration::from_millis(min);
        let max_interval = Duration::from_millis(max.max(min));
        let pace = Pace {
            interval: min_interval,
            next_slot: Instant::now(),
        };
        Self {
            min_interval,
            max_interval,
            pace: Mutex::new(pace),
        }
    }

    pub async fn wait(&self) {
        let slot = {
            let mut pace = self.pace.lock().await;
            let slot = std::cmp::max(pace.next_slot, Instant::now());
            pace.next_slot = slot + pace.interval;
            log::debug!("rate control: next slot in {}ms", pace.interval.as_millis());
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    pub async fn speed_up(&self) {
        let mut pace = self.pace.lock().await;
        pace.interval = std::cmp::max(pace.interval * 9 / 10, self.min_interval);
    }

    pub async fn slow_down(&self) {
        let mut pace = self.pace.lock().await;
        // a zero interval would never grow back
        let grown = std::cmp::max(pace.interval * 2, Duration::from_millis(100));
        pace.interval = std::cmp::min(grown, self.max_interval);
    }

    pub async fn interval(&self) -> Duration {
        self.pace.lock().await.interval
    }
}
