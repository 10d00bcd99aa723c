//! Per-client sliding-window admission control.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use curhat_core::ClientId;
use tracing::debug;

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Throttled,
}

/// Above this many tracked clients, idle windows are swept from `admit`.
const SWEEP_THRESHOLD: usize = 10_000;

struct Windows {
    clients: HashMap<ClientId, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Windows {
    /// Drop clients whose latest hit has aged out of the window.
    fn sweep(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, hits| {
            hits.back()
                .is_some_and(|t| now.saturating_duration_since(*t) < window)
        });
        self.last_sweep = Some(now);
        before - self.clients.len()
    }
}

/// In-memory sliding-window rate limiter.
///
/// Tracks admission timestamps per client key.
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
///
/// Once more than `sweep_threshold` clients are tracked, `admit` sweeps idle
/// windows at most once per window length. [`RateLimiter::sweep`] does the
/// same on demand.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    sweep_threshold: usize,
    state: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            sweep_threshold: SWEEP_THRESHOLD,
            state: Mutex::new(Windows {
                clients: HashMap::new(),
                last_sweep: None,
            }),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    /// Prune hits older than `now - window`, then admit and record `now`
    /// if fewer than `max_requests` remain. Throttled calls are not recorded.
    pub fn admit(&self, client: &ClientId, now: Instant) -> Admission {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let sweep_due = state
            .last_sweep
            .is_none_or(|t| now.saturating_duration_since(t) >= self.window);
        if state.clients.len() > self.sweep_threshold && sweep_due {
            let removed = state.sweep(now, self.window);
            debug!(removed, "Swept idle rate-limit windows");
        }

        let hits = state.clients.entry(client.clone()).or_default();

        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() >= self.max_requests {
            return Admission::Throttled;
        }

        hits.push_back(now);
        Admission::Admitted
    }

    /// Drop every client whose window holds no live hit. Returns how many.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.sweep(now, self.window)
    }

    /// Number of clients with a window on record.
    pub fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clients
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(s: &str) -> ClientId {
        ClientId::new(s)
    }

    #[test]
    fn admits_up_to_limit_then_throttles() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..3 {
            assert_eq!(limiter.admit(&client("a"), now), Admission::Admitted);
        }
        assert_eq!(limiter.admit(&client("a"), now), Admission::Throttled);
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        assert_eq!(limiter.admit(&client("a"), t0), Admission::Admitted);
        assert_eq!(
            limiter.admit(&client("a"), t0 + Duration::from_secs(30)),
            Admission::Admitted
        );
        assert_eq!(
            limiter.admit(&client("a"), t0 + Duration::from_secs(59)),
            Admission::Throttled
        );
        // The first hit has aged out.
        assert_eq!(
            limiter.admit(&client("a"), t0 + Duration::from_secs(60)),
            Admission::Admitted
        );
    }

    #[test]
    fn throttled_calls_are_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(limiter.admit(&client("a"), t0), Admission::Admitted);
        for s in 1..10 {
            assert_eq!(
                limiter.admit(&client("a"), t0 + Duration::from_secs(s)),
                Admission::Throttled
            );
        }
        // Only the first hit counts, so the window reopens at t0 + 10s.
        assert_eq!(
            limiter.admit(&client("a"), t0 + Duration::from_secs(10)),
            Admission::Admitted
        );
    }

    #[test]
    fn clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert_eq!(limiter.admit(&client("a"), now), Admission::Admitted);
        assert_eq!(limiter.admit(&client("b"), now), Admission::Admitted);
        assert_eq!(limiter.admit(&client("a"), now), Admission::Throttled);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn sweep_drops_only_idle_clients() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let t0 = Instant::now();
        limiter.admit(&client("old"), t0);
        limiter.admit(&client("fresh"), t0 + Duration::from_secs(50));

        assert_eq!(limiter.sweep(t0 + Duration::from_secs(70)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn admit_sweeps_at_most_once_per_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60)).with_sweep_threshold(2);
        let t0 = Instant::now();
        for c in ["a", "b", "c"] {
            limiter.admit(&client(c), t0);
        }
        assert_eq!(limiter.tracked_clients(), 3);

        // Over the threshold and never swept: the idle windows go.
        let t1 = t0 + Duration::from_secs(61);
        limiter.admit(&client("d"), t1);
        assert_eq!(limiter.tracked_clients(), 1);

        // Over the threshold again, but the last sweep is too recent.
        let t2 = t1 + Duration::from_secs(1);
        for c in ["e", "f", "g"] {
            limiter.admit(&client(c), t2);
        }
        assert_eq!(limiter.tracked_clients(), 4);
    }
}
