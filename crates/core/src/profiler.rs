/// Stage timing helpers.
///
/// `ProfilerScope` reports each pipeline stage at `trace` level when it goes
/// out of scope; `FrameTimer` keeps a smoothed per-tick cost for the driver.
use std::time::Instant;
use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!(stage = self.name, elapsed_ms = self.elapsed_ms(), "stage done");
    }
}

/// Exponentially smoothed tick timer.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_ms: f64,
    average_ms: f64,
    samples: u64,
}

impl FrameTimer {
    /// Weight of the newest sample in the running average.
    const SMOOTHING: f64 = 0.1;

    pub fn new() -> Self {
        Self {
            last_ms: 0.0,
            average_ms: 0.0,
            samples: 0,
        }
    }

    pub fn record(&mut self, time_ms: f64) {
        self.last_ms = time_ms;
        self.average_ms = if self.samples == 0 {
            time_ms
        } else {
            self.average_ms + Self::SMOOTHING * (time_ms - self.average_ms)
        };
        self.samples += 1;
    }

    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    pub fn average_ms(&self) -> f64 {
        self.average_ms
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_profiler_scope_measures_time() {
        let scope = ProfilerScope::new("test");
        thread::sleep(Duration::from_millis(10));
        let elapsed = scope.elapsed_ms();
        assert!(elapsed >= 10.0, "Expected at least 10ms, got {elapsed}");
    }

    #[test]
    fn test_frame_timer_smooths() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.samples(), 0);

        timer.record(10.0);
        assert_eq!(timer.last_ms(), 10.0);
        assert_eq!(timer.average_ms(), 10.0);

        timer.record(20.0);
        assert_eq!(timer.last_ms(), 20.0);
        assert!((timer.average_ms() - 11.0).abs() < 1e-9);
        assert_eq!(timer.samples(), 2);
    }
}
