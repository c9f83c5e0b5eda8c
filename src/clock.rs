use std::time::{Duration, Instant};

/// Source of monotonic time deltas for the control loop.
pub trait Clock {
    /// Time elapsed since the previous call (or since creation).
    fn delta(&mut self) -> Duration;
}

/// Wall-clock-immune clock backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    last: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Time since the last delta, without consuming it.
    pub fn since_last(&self) -> Duration {
        self.last.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let d = now.saturating_duration_since(self.last);
        self.last = now;
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_consumed() {
        let mut clock = MonotonicClock::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = clock.delta();
        assert!(first >= Duration::from_millis(5));
        assert!(clock.since_last() < first + Duration::from_secs(1));
    }
}
