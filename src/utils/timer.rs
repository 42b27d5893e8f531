//! Wall-clock timing for the benchmark harness: `tic()` starts, `toc()`
//! accumulates elapsed time, and the total is read back once a phase is
//! done.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TimeMeasurer {
    started_at: Option<Instant>,
    elapsed: Duration,
}

impl Default for TimeMeasurer {
    fn default() -> Self {
        TimeMeasurer { started_at: None, elapsed: Duration::ZERO }
    }
}

impl TimeMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tic(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn toc(&mut self) {
        if let Some(start) = self.started_at.take() {
            self.elapsed += start.elapsed();
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}
