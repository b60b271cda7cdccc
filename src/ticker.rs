//! Cancellable fixed-period ticker using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. `Ticker` converts this
//! into a whole number of firings per period, so the auto-clicker runs on a
//! steady cadence and stays fully testable with synthetic timestamps.
//!
//! A ticker is armed under a `key` describing what it was armed for (the
//! auto-click rate). Re-arming with the same key is a no-op; a different key
//! tears the old schedule down and starts a fresh one, so there is never more
//! than one schedule alive.

/// Cap on the wall-clock gap consumed by a single `update`, so a backgrounded
/// tab does not come back to a burst of catch-up firings.
const MAX_FRAME_DELTA_MS: f64 = 5_000.0;

struct Armed {
    key: u64,
    accumulator: f64,
    last_timestamp: f64,
}

pub struct Ticker {
    period_ms: f64,
    armed: Option<Armed>,
    /// Total firings since creation.
    pub total_fires: u64,
}

impl Ticker {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms: period_ms.max(1.0),
            armed: None,
            total_fires: 0,
        }
    }

    /// Arm the ticker. Returns `true` if a new schedule was created.
    ///
    /// Calling `start` again with the same key does not double-arm; calling it
    /// with a different key cancels the running schedule and re-creates it,
    /// measuring the first period from `now_ms`.
    pub fn start(&mut self, key: u64, now_ms: f64) -> bool {
        if let Some(armed) = &self.armed {
            if armed.key == key {
                return false;
            }
        }
        self.armed = Some(Armed {
            key,
            accumulator: 0.0,
            last_timestamp: now_ms,
        });
        true
    }

    /// Cancel the schedule. Safe to call when not armed.
    pub fn stop(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Feed a wall-clock timestamp. Returns how many periods elapsed since the
    /// previous call (0 when not armed).
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let period = self.period_ms;
        let Some(armed) = self.armed.as_mut() else {
            return 0;
        };
        let delta = (now_ms - armed.last_timestamp).clamp(0.0, MAX_FRAME_DELTA_MS);
        armed.last_timestamp = now_ms;

        armed.accumulator += delta;
        let fires = (armed.accumulator / period) as u32;
        armed.accumulator -= fires as f64 * period;
        self.total_fires += fires as u64;
        fires
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_never_fires() {
        let mut t = Ticker::new(1000.0);
        assert_eq!(t.update(0.0), 0);
        assert_eq!(t.update(10_000.0), 0);
        assert_eq!(t.total_fires, 0);
    }

    #[test]
    fn fires_once_per_period() {
        let mut t = Ticker::new(1000.0);
        assert!(t.start(1, 0.0));
        assert_eq!(t.update(999.0), 0);
        assert_eq!(t.update(1000.0), 1);
        assert_eq!(t.update(2000.0), 1);
        assert_eq!(t.total_fires, 2);
    }

    #[test]
    fn remainder_carried_over() {
        let mut t = Ticker::new(1000.0);
        t.start(1, 0.0);
        assert_eq!(t.update(1500.0), 1); // 500ms left over
        assert_eq!(t.update(2000.0), 1); // 500 + 500
        assert_eq!(t.total_fires, 2);
    }

    #[test]
    fn start_twice_same_key_does_not_reset() {
        let mut t = Ticker::new(1000.0);
        assert!(t.start(7, 0.0));
        t.update(600.0);
        assert!(!t.start(7, 600.0));
        // Accumulated 600ms survives the redundant start.
        assert_eq!(t.update(1000.0), 1);
    }

    #[test]
    fn start_with_new_key_recreates_schedule() {
        let mut t = Ticker::new(1000.0);
        t.start(1, 0.0);
        t.update(900.0);
        assert!(t.start(2, 900.0));
        // Fresh schedule: the old 900ms is discarded.
        assert_eq!(t.update(1000.0), 0);
        assert_eq!(t.update(1900.0), 1);
    }

    #[test]
    fn stop_cancels() {
        let mut t = Ticker::new(1000.0);
        t.start(1, 0.0);
        t.stop();
        assert!(!t.is_armed());
        assert_eq!(t.update(5000.0), 0);
        t.stop();
        assert!(!t.is_armed());
    }

    #[test]
    fn clamp_large_delta() {
        let mut t = Ticker::new(1000.0);
        t.start(1, 0.0);
        // Tab backgrounded for a minute → clamped to 5 seconds
        assert_eq!(t.update(60_000.0), 5);
    }

    #[test]
    fn steady_60fps() {
        let mut t = Ticker::new(1000.0);
        t.start(1, 0.0);
        let mut total = 0u32;
        for i in 1..=180 {
            total += t.update(i as f64 * 16.667);
        }
        // ~3 seconds of frames
        assert!((2..=3).contains(&total), "expected ~3 fires, got {}", total);
    }
}
