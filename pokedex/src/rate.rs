//! Advisory sliding-window request counter.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: usize = 100;

/// Snapshot of the remaining request budget, safe to hand to the reducer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateBudget {
    pub remaining: usize,
    pub max_requests: usize,
}

impl RateBudget {
    pub fn full(max_requests: usize) -> Self {
        Self {
            remaining: max_requests,
            max_requests,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.max_requests == 0 {
            return 0.0;
        }
        self.remaining as f64 / self.max_requests as f64 * 100.0
    }
}

impl Default for RateBudget {
    fn default() -> Self {
        Self::full(DEFAULT_MAX_REQUESTS)
    }
}

/// Counts requests issued inside a trailing window. It never blocks or
/// delays anything; callers only read the remaining budget.
#[derive(Debug)]
pub struct RateTracker {
    window: Duration,
    max_requests: usize,
    requests: VecDeque<Instant>,
}

impl RateTracker {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            requests: VecDeque::new(),
        }
    }

    pub fn add_request(&mut self) {
        let now = Instant::now();
        self.purge(now);
        self.requests.push_back(now);
    }

    pub fn remaining(&mut self) -> usize {
        self.purge(Instant::now());
        self.max_requests.saturating_sub(self.requests.len())
    }

    pub fn percentage(&mut self) -> f64 {
        self.budget().percentage()
    }

    pub fn budget(&mut self) -> RateBudget {
        RateBudget {
            remaining: self.remaining(),
            max_requests: self.max_requests,
        }
    }

    // Timestamps are pushed in order, so expired ones sit at the front.
    fn purge(&mut self, now: Instant) {
        while let Some(oldest) = self.requests.front() {
            if now.duration_since(*oldest) > self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_requests_consume_budget() {
        let mut tracker = RateTracker::new(Duration::from_secs(60), 4);
        tracker.add_request();
        tracker.add_request();
        tracker.add_request();

        assert_eq!(tracker.remaining(), 1);
        assert_eq!(tracker.percentage(), 25.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_never_negative() {
        let mut tracker = RateTracker::new(Duration::from_secs(60), 2);
        for _ in 0..5 {
            tracker.add_request();
        }

        assert_eq!(tracker.remaining(), 0);
        assert_eq!(tracker.percentage(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_recovers_after_window() {
        let mut tracker = RateTracker::new(Duration::from_secs(60), 100);
        for _ in 0..10 {
            tracker.add_request();
        }
        assert_eq!(tracker.remaining(), 90);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(tracker.remaining(), 100);
        assert_eq!(tracker.percentage(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_old_requests_are_purged() {
        let mut tracker = RateTracker::new(Duration::from_secs(60), 10);
        tracker.add_request();
        tokio::time::advance(Duration::from_secs(40)).await;
        tracker.add_request();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(tracker.remaining(), 9);
    }
}
