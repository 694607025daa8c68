//! One decode pass over a captured window

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::candidate::{tokenize, Candidate};
use crate::capture::{CaptureWriter, DECODE_CAPTURE_NAME};
use crate::config::WindowConfig;
use crate::fano::{FanoDecoder, SequentialDecoder};
use crate::fft::{FftTransform, RustFft};
use crate::spot::{Spot, SpotSink};

use super::collector::Window;
use super::extract::{extract, local_bins};
use super::peaks::{detect, MagnitudeSpectrum, PeakSet};
use super::search::search_candidate;
use super::spectra::Spectrogram;
use super::AUDIO_OFFSET;

/// Everything a decode pass owns: the window being decoded, the long-lived
/// spectral buffers and the decoder scratch
pub struct Workspace {
    config: WindowConfig,
    window: Window,
    spectrogram: Spectrogram,
    magnitude: MagnitudeSpectrum,
    peaks: PeakSet,
    candidate: Candidate,
    fft: Box<dyn FftTransform>,
    decoder: Box<dyn SequentialDecoder + Send>,
    sink: Arc<dyn SpotSink>,
    capture: Arc<dyn CaptureWriter>,
}

impl Workspace {
    pub fn new(config: WindowConfig, sink: Arc<dyn SpotSink>, capture: Arc<dyn CaptureWriter>) -> Self {
        let fft = Box::new(RustFft::new(config.size));
        Self::with_decoder(config, sink, capture, fft, Box::new(FanoDecoder::new()))
    }

    pub fn with_decoder(
        config: WindowConfig,
        sink: Arc<dyn SpotSink>,
        capture: Arc<dyn CaptureWriter>,
        fft: Box<dyn FftTransform>,
        decoder: Box<dyn SequentialDecoder + Send>,
    ) -> Self {
        Self {
            window: Window::new(&config),
            spectrogram: Spectrogram::new(&config),
            magnitude: MagnitudeSpectrum::new(config.size),
            peaks: PeakSet::with_capacity(config.number),
            candidate: Candidate::default(),
            fft,
            decoder,
            sink,
            capture,
            config,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    pub fn peaks(&self) -> &PeakSet {
        &self.peaks
    }

    /// Decode the held window, reporting a spot for every accepted peak
    ///
    /// With `dedup_spots`, a message text already reported in this pass is
    /// decoded but not reported again.
    pub fn decode_pass(&mut self) -> Vec<Spot> {
        let frames = self.spectrogram.accumulate(&self.window.samples, self.fft.as_mut());
        self.magnitude.accumulate(&self.spectrogram);
        detect(&mut self.magnitude, self.config.number, &mut self.peaks);
        debug!(frames, peaks = ?self.peaks.bins(), "spectral pass complete");

        let mut reported = HashSet::new();
        let mut spots = Vec::new();

        for (peak_index, &bin) in self.peaks.bins().iter().enumerate() {
            let local = local_bins(bin, self.config.size);
            self.candidate.peak_index = peak_index;
            self.candidate.bin = bin;

            for shift in (0..self.config.shifts).step_by(self.config.shift_stride) {
                self.candidate.shift = shift;
                extract(&self.spectrogram, shift, &local, &mut self.candidate.records);
                if !self.candidate.is_valid() {
                    debug!(bin, shift, records = self.candidate.records.len(), "candidate too short");
                    continue;
                }

                let tokens = tokenize(self.candidate.healthy());
                let Some(decode) =
                    search_candidate(&tokens, self.decoder.as_mut(), self.config.delta, self.config.max_cycles)
                else {
                    continue;
                };

                info!(
                    bin,
                    shift,
                    offset = decode.window_offset,
                    permutation = decode.permutation,
                    cycles = decode.stats.cycles,
                    attempts = decode.attempts,
                    "decoded {}",
                    decode.message
                );
                self.capture.write(DECODE_CAPTURE_NAME, &self.window.samples);

                if self.config.dedup_spots && !reported.insert(decode.message.call_loc_pow.clone()) {
                    debug!(bin, "already reported {}", decode.message.call_loc_pow);
                    break;
                }

                let frequency =
                    self.config.dial_freq + AUDIO_OFFSET + self.candidate.frequency_offset(self.config.delta_freq());
                let mut spot = Spot::new(decode.message, frequency, self.window.capture_time);
                spot.peak_index = peak_index;
                spot.bin = bin;
                spot.shift = shift;
                spot.window_offset = decode.window_offset;
                spot.permutation = decode.permutation;

                self.sink.report(&spot);
                spots.push(spot);
                break;
            }
        }
        spots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::NullCaptureWriter;
    use crate::spot::MemorySink;

    fn tiny_config() -> WindowConfig {
        // 162 frames of 8 bins, one shift
        WindowConfig {
            size: 8,
            number: 2,
            sample_rate: 8,
            processing_seconds: 162,
            period_seconds: 170,
            shifts: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_silent_window_yields_no_spots() {
        let sink = Arc::new(MemorySink::new());
        let mut workspace = Workspace::new(tiny_config(), sink.clone(), Arc::new(NullCaptureWriter));

        assert!(workspace.decode_pass().is_empty());
        assert!(sink.spots().is_empty());
        assert_eq!(workspace.peaks().bins(), &[0, 0]);
    }

    #[test]
    fn test_spectrum_is_cleared_between_passes() {
        let sink = Arc::new(MemorySink::new());
        let mut workspace = Workspace::new(tiny_config(), sink, Arc::new(NullCaptureWriter));

        for (i, pair) in workspace.window_mut().samples.chunks_exact_mut(2).enumerate() {
            let phase = 2.0 * std::f32::consts::PI * 3.0 * i as f32 / 8.0;
            pair[0] = phase.cos();
            pair[1] = phase.sin();
        }
        workspace.decode_pass();
        assert_eq!(workspace.peaks().bins()[0], 3);

        workspace.window_mut().samples.iter_mut().for_each(|s| *s = 0.0);
        workspace.decode_pass();
        assert_eq!(workspace.peaks().bins(), &[0, 0]);
    }
}
