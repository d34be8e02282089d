use std::{fmt, time::{Duration, Instant}};

/// Wall-clock bookkeeping at pass boundaries. Purely informational.
#[derive(Debug, Clone)]
pub struct PassTimer {
    start: Instant,
    previous: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub passes: u64,
    pub passes_per_second: f64,
    pub delta: Duration,
}

impl PassTimer {
    pub fn new(start: Instant) -> PassTimer {
        PassTimer { start, previous: start }
    }

    /// Call when `passes` full passes have completed at time `now`
    pub fn record_pass(&mut self, passes: u64, now: Instant) -> PassReport {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        let delta = now.saturating_duration_since(self.previous);
        self.previous = now;

        let passes_per_second = if elapsed > 0.0 { passes as f64 / elapsed } else { 0.0 };

        PassReport { passes, passes_per_second, delta }
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number of iterations: {:>4} FPS: {:>7.2} Delta: {:>7.4}",
            self.passes,
            self.passes_per_second,
            self.delta.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_and_delta() {
        let start = Instant::now();
        let mut timer = PassTimer::new(start);

        let first = timer.record_pass(1, start + Duration::from_millis(500));
        assert_eq!(first.delta, Duration::from_millis(500));
        assert!((first.passes_per_second - 2.0).abs() < 1e-9);

        let second = timer.record_pass(2, start + Duration::from_millis(2000));
        assert_eq!(second.delta, Duration::from_millis(1500));
        assert!((second.passes_per_second - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_reports_zero_rate() {
        let start = Instant::now();
        let report = PassTimer::new(start).record_pass(1, start);
        assert_eq!(report.passes_per_second, 0.0);
    }

    #[test]
    fn status_line() {
        let report = PassReport { passes: 12, passes_per_second: 3.5, delta: Duration::from_millis(250) };
        assert_eq!(report.to_string(), "Number of iterations:   12 FPS:    3.50 Delta:  0.2500");
    }
}
