//! Window pipeline configuration

use std::path::PathBuf;

use snafu::ensure;

use crate::error::{InvalidConfigSnafu, Result};
use crate::window::{NOMINAL_NUMBER_OF_SYMBOLS, WINDOW};

/// Configuration for the WSPR window collector and decode pass
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// FFT length in complex samples (one WSPR symbol at the default rate)
    pub size: usize,
    /// Number of peak bins to examine per cycle
    pub number: usize,
    /// Directory for raw capture files
    pub prefix: PathBuf,
    /// Receiver dial frequency (Hz)
    pub dial_freq: f64,
    /// Skip the even-minute alignment before each capture
    pub skip_sync: bool,
    /// Complex baseband sample rate (Hz)
    pub sample_rate: usize,
    /// Length of the WSPR cycle (s)
    pub period_seconds: usize,
    /// Length of the captured processing window (s)
    pub processing_seconds: usize,
    /// Number of sample offsets the FFT bank is re-run at
    pub shifts: usize,
    /// The extractor visits every `shift_stride`-th shift
    pub shift_stride: usize,
    /// Fano decoder node-expansion cap per attempt
    pub max_cycles: u32,
    /// Fano threshold spacing
    pub delta: i32,
    /// Report each message text at most once per pass
    pub dedup_spots: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: 256,
            number: 9,
            prefix: PathBuf::from("."),
            dial_freq: 14_095_600.0,
            skip_sync: false,
            sample_rate: 375,
            period_seconds: 120,
            processing_seconds: 116,
            shifts: 256,
            shift_stride: 10,
            max_cycles: 10_000,
            delta: 60,
            dedup_spots: false,
        }
    }
}

impl WindowConfig {
    /// Floats (interleaved I/Q) in one processing window
    pub fn sample_buffer_size(&self) -> usize {
        self.sample_rate * self.processing_seconds * 2
    }

    /// Floats in one full WSPR cycle
    pub fn period_floats(&self) -> usize {
        self.sample_rate * self.period_seconds * 2
    }

    /// Floats left in a cycle after the processing window
    pub fn remainder_floats(&self) -> usize {
        self.sample_rate * (self.period_seconds - self.processing_seconds) * 2
    }

    /// Spectrogram frames available to each shift
    pub fn ffts_per_shift(&self) -> usize {
        self.sample_rate * self.processing_seconds / self.size
    }

    /// Bin spacing (Hz)
    pub fn delta_freq(&self) -> f64 {
        self.sample_rate as f64 / self.size as f64
    }

    /// Duration of one FFT frame (s)
    pub fn delta_time(&self) -> f64 {
        self.size as f64 / self.sample_rate as f64
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.size > 0 && self.number > 0 && self.sample_rate > 0,
            InvalidConfigSnafu { reason: "size, number and sample rate must be non-zero" }
        );
        ensure!(
            WINDOW <= self.size,
            InvalidConfigSnafu { reason: format!("FFT size {} smaller than local window {}", self.size, WINDOW) }
        );
        ensure!(
            self.number <= self.size,
            InvalidConfigSnafu { reason: format!("cannot pick {} peaks from {} bins", self.number, self.size) }
        );
        ensure!(
            self.processing_seconds < self.period_seconds,
            InvalidConfigSnafu { reason: "processing window must be shorter than the period" }
        );
        ensure!(
            self.ffts_per_shift() >= NOMINAL_NUMBER_OF_SYMBOLS,
            InvalidConfigSnafu {
                reason: format!(
                    "{} frames per shift cannot hold {} symbols",
                    self.ffts_per_shift(),
                    NOMINAL_NUMBER_OF_SYMBOLS
                )
            }
        );
        ensure!(
            self.shifts > 0 && self.shift_stride > 0,
            InvalidConfigSnafu { reason: "shifts and shift stride must be non-zero" }
        );
        ensure!(
            self.delta > 0 && self.max_cycles > 0,
            InvalidConfigSnafu {
                reason: format!("Fano delta {} and cycle cap {} must be positive", self.delta, self.max_cycles)
            }
        );
        Ok(())
    }
}
