//! Candidate analysis: validity, tokens and frequency of a peak's record series

use crate::window::{SampleRecord, NOMINAL_NUMBER_OF_SYMBOLS, WINDOW};

/// Tones in a WSPR symbol alphabet
pub const TONES: usize = 4;

/// One peak bin and the records extracted for it at one shift
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    /// Position of the peak in the peak set
    pub peak_index: usize,
    pub bin: usize,
    pub shift: usize,
    pub records: Vec<SampleRecord>,
}

impl Candidate {
    pub fn new(peak_index: usize, bin: usize) -> Self {
        Self { peak_index, bin, shift: 0, records: Vec::new() }
    }

    /// Records before the first degenerate one
    pub fn healthy(&self) -> &[SampleRecord] {
        let count = self.records.iter().take_while(|r| !r.is_degenerate()).count();
        &self.records[..count]
    }

    /// Enough leading records to hold a whole transmission
    pub fn is_valid(&self) -> bool {
        self.healthy().len() >= NOMINAL_NUMBER_OF_SYMBOLS
    }

    /// Carrier offset of the peak above baseband 0 Hz
    pub fn frequency_offset(&self, delta_freq: f64) -> f64 {
        self.bin as f64 * delta_freq
    }

    /// Window offsets a 162-symbol frame can start at
    pub fn window_offsets(&self) -> usize {
        (self.healthy().len() + 1).saturating_sub(NOMINAL_NUMBER_OF_SYMBOLS)
    }
}

/// First of the `TONES` adjacent local bins holding the most total magnitude
pub fn tone_group(records: &[SampleRecord]) -> usize {
    let mut totals = [0.0f32; WINDOW];
    for record in records {
        for (total, bin) in totals.iter_mut().zip(record.bins.iter()) {
            *total += bin.magnitude;
        }
    }

    let mut best = 0;
    let mut best_sum = f32::MIN;
    for start in 0..=WINDOW - TONES {
        let sum: f32 = totals[start..start + TONES].iter().sum();
        if sum > best_sum {
            best = start;
            best_sum = sum;
        }
    }
    best
}

/// Strongest tone (0..4) of each record within the best tone group
pub fn tokenize(records: &[SampleRecord]) -> Vec<u8> {
    let group = tone_group(records);
    records
        .iter()
        .map(|record| {
            let tones = &record.bins[group..group + TONES];
            let mut token = 0;
            for (tone, bin) in tones.iter().enumerate() {
                if bin.magnitude > tones[token].magnitude {
                    token = tone;
                }
            }
            token as u8
        })
        .collect()
}
