///! Multi-shift spectrogram
///!
///! The FFT is run over back-to-back `size`-sample segments starting at every
///! shift offset 0..shifts, giving sub-symbol time resolution.

use rustfft::num_complex::Complex32;

use crate::config::WindowConfig;
use crate::fft::FftTransform;

/// `shifts` x `ffts_per_shift` complex frames of `size` bins
///
/// Allocated zeroed once and overwritten in place every cycle. Frames a shift
/// cannot fill (its last segments run past the window) keep their old contents.
pub struct Spectrogram {
    size: usize,
    shifts: usize,
    ffts_per_shift: usize,
    frames: Vec<Complex32>,
}

impl Spectrogram {
    pub fn new(config: &WindowConfig) -> Self {
        let ffts_per_shift = config.ffts_per_shift();
        Self {
            size: config.size,
            shifts: config.shifts,
            ffts_per_shift,
            frames: vec![Complex32::new(0.0, 0.0); config.shifts * ffts_per_shift * config.size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shifts(&self) -> usize {
        self.shifts
    }

    pub fn ffts_per_shift(&self) -> usize {
        self.ffts_per_shift
    }

    fn offset(&self, shift: usize, step: usize) -> usize {
        (shift * self.ffts_per_shift + step) * self.size
    }

    /// Bins of frame `step` at `shift`
    pub fn frame(&self, shift: usize, step: usize) -> &[Complex32] {
        let start = self.offset(shift, step);
        &self.frames[start..start + self.size]
    }

    /// Transform `samples` (interleaved I/Q) at every shift
    ///
    /// Returns the number of frames written.
    pub fn accumulate(&mut self, samples: &[f32], fft: &mut dyn FftTransform) -> usize {
        let segment = 2 * self.size;
        let mut written = 0;

        for shift in 0..self.shifts {
            for step in 0..self.ffts_per_shift {
                let begin = 2 * shift + step * segment;
                let end = begin + segment;
                if end > samples.len() {
                    break;
                }
                let start = self.offset(shift, step);
                fft.process(&samples[begin..end], &mut self.frames[start..start + self.size]);
                written += 1;
            }
        }
        written
    }
}
