//! Forward FFT used by the spectral accumulator

use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// Transforms `size` interleaved complex samples into `size` complex bins
pub trait FftTransform: Send {
    fn size(&self) -> usize;

    /// `input` holds `2 * size` floats (I, Q pairs); `output` holds `size` bins
    fn process(&mut self, input: &[f32], output: &mut [Complex32]);
}

/// Forward complex FFT planned once with rustfft
pub struct RustFft {
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl RustFft {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }
}

impl FftTransform for RustFft {
    fn size(&self) -> usize {
        self.fft.len()
    }

    fn process(&mut self, input: &[f32], output: &mut [Complex32]) {
        let size = self.fft.len();
        for (bin, pair) in output[..size].iter_mut().zip(input[..2 * size].chunks_exact(2)) {
            *bin = Complex32::new(pair[0], pair[1]);
        }
        self.fft.process_with_scratch(&mut output[..size], &mut self.scratch);
    }
}
