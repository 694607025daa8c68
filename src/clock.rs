//! Time sources for the even-minute synchronizer and capture labels

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as seen by the collector
pub trait Clock {
    fn now(&self) -> f64;

    /// Called with every batch of complex samples the collector consumes
    fn advance(&mut self, _complex_samples: usize) {}

    /// Whole UTC minute number
    fn minute(&self) -> i64 {
        (self.now() / 60.0).floor() as i64
    }
}

/// Wall clock, for live streams
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock derived from the sample count, for recorded streams
#[derive(Debug, Clone, Copy)]
pub struct StreamClock {
    start: f64,
    sample_rate: f64,
    consumed: u64,
}

impl StreamClock {
    pub fn new(start: f64, sample_rate: usize) -> Self {
        Self { start, sample_rate: sample_rate as f64, consumed: 0 }
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl Clock for StreamClock {
    fn now(&self) -> f64 {
        self.start + self.consumed as f64 / self.sample_rate
    }

    fn advance(&mut self, complex_samples: usize) {
        self.consumed += complex_samples as u64;
    }
}
