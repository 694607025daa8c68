//! Peak bin selection from accumulated magnitude
//!
//! The first peak is the strongest bin. Each later peak is the strongest bin
//! strictly weaker than the one before, scanning bins in ascending order, so
//! among equal magnitudes the lowest bin wins and the others are skipped.
//! Picked bins are not excluded otherwise: when nothing non-zero lies below
//! the running threshold the previous bin is picked again.

use tracing::trace;

use super::spectra::Spectrogram;

/// Per-bin magnitude summed over the frames of shift 0
#[derive(Debug, Clone)]
pub struct MagnitudeSpectrum {
    bins: Vec<f32>,
}

impl MagnitudeSpectrum {
    pub fn new(size: usize) -> Self {
        Self { bins: vec![0.0; size] }
    }

    pub fn from_bins(bins: Vec<f32>) -> Self {
        Self { bins }
    }

    pub fn accumulate(&mut self, spectrogram: &Spectrogram) {
        for step in 0..spectrogram.ffts_per_shift() {
            for (total, bin) in self.bins.iter_mut().zip(spectrogram.frame(0, step)) {
                *total += bin.norm();
            }
        }
    }

    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
    }
}

/// Selected bins, strongest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakSet {
    bins: Vec<usize>,
}

impl PeakSet {
    pub fn with_capacity(number: usize) -> Self {
        Self { bins: Vec::with_capacity(number) }
    }

    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Strongest bin with magnitude in `(0, threshold)`, or `previous` if none
pub fn pick_next_below(magnitudes: &[f32], threshold: f32, previous: usize) -> usize {
    let mut best = previous;
    let mut best_value = 0.0f32;
    for (bin, &value) in magnitudes.iter().enumerate() {
        if value > best_value && value < threshold {
            best = bin;
            best_value = value;
        }
    }
    best
}

/// Fill `peaks` with `number` bins, then zero the spectrum for the next cycle
pub fn detect(magnitude: &mut MagnitudeSpectrum, number: usize, peaks: &mut PeakSet) {
    peaks.bins.clear();

    let mut threshold = f32::INFINITY;
    let mut previous = 0;
    for _ in 0..number {
        let bin = pick_next_below(&magnitude.bins, threshold, previous);
        threshold = magnitude.bins[bin];
        previous = bin;
        peaks.bins.push(bin);
    }

    for (bin, value) in magnitude.bins.iter().enumerate() {
        let flag = if peaks.bins.contains(&bin) { "*" } else { "" };
        trace!("{} {:.3} {}", bin, value, flag);
    }

    magnitude.reset();
}
