//! Per-peak time series of local spectral slices

use tracing::warn;

use super::spectra::Spectrogram;
use super::{NOISE_FLOOR, WINDOW};

/// One bin of a local slice
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalBin {
    pub magnitude: f32,
    pub re: f32,
    pub im: f32,
}

/// The `WINDOW` bins around a peak at one time step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleRecord {
    /// Magnitude-weighted bin offset from the peak, in bins
    ///
    /// Ranges over `-(WINDOW / 2)..=WINDOW / 2`; 0 on a degenerate slice.
    pub centroid: f32,
    /// Summed magnitude over the slice
    pub magnitude: f32,
    pub bins: [LocalBin; WINDOW],
}

impl SampleRecord {
    pub fn is_degenerate(&self) -> bool {
        self.magnitude <= NOISE_FLOOR
    }
}

/// `WINDOW` consecutive bins centered on `peak`, wrapping around `size`
pub fn local_bins(peak: usize, size: usize) -> [usize; WINDOW] {
    let half = (WINDOW / 2) as isize;
    let mut bins = [0usize; WINDOW];
    for (i, bin) in bins.iter_mut().enumerate() {
        *bin = (peak as isize + i as isize - half).rem_euclid(size as isize) as usize;
    }
    bins
}

/// Build the record series for one shift into `records`
///
/// Stops after the first degenerate record, which is kept.
pub fn extract(spectrogram: &Spectrogram, shift: usize, local: &[usize; WINDOW], records: &mut Vec<SampleRecord>) {
    records.clear();
    let half = (WINDOW / 2) as f32;

    for step in 0..spectrogram.ffts_per_shift() {
        let frame = spectrogram.frame(shift, step);
        let mut record = SampleRecord::default();
        let mut weighted = 0.0f32;

        for (i, (slot, &bin)) in record.bins.iter_mut().zip(local.iter()).enumerate() {
            let value = frame[bin];
            let magnitude = value.norm();
            *slot = LocalBin { magnitude, re: value.re, im: value.im };
            record.magnitude += magnitude;
            weighted += magnitude * i as f32;
        }
        if record.is_degenerate() {
            warn!(shift, step, magnitude = record.magnitude, "degenerate slice, ending shift");
            records.push(record);
            break;
        }

        record.centroid = weighted / record.magnitude - half;
        records.push(record);
    }
}
