//! WSPR Window Pipeline
//!
//! A collector aligns to the even-minute grid, captures one processing window
//! per two-minute cycle and hands it to a single background decode pass while
//! it goes back to reading.
//!
//! **Decode pass** (runs in the worker):
//! 1. Slide the FFT across the window at `shifts` sample offsets ([`Spectrogram`])
//! 2. Sum shift 0 magnitudes per bin and pick `number` peaks ([`detect`])
//! 3. For every 10th shift, take a `WINDOW`-bin slice around each peak ([`extract`])
//! 4. Tokenize, then try each window offset and each of the 24 tone orderings
//!    against the Fano decoder until one is accepted ([`search_candidate`])
//!
//! **Backpressure**: while a pass is still running, the rest of the current
//! cycle and every following full cycle are dropped unread.
//!
//! **Module Organization**:
//! - `collector` - Window buffer, even-minute sync, capture
//! - `spectra` - Multi-shift spectrogram
//! - `peaks` - Magnitude accumulation and greedy peak selection
//! - `extract` - Per-peak local bin slices
//! - `search` - Permutation search over window offsets
//! - `pass` - Decode workspace tying the stages together
//! - `scheduler` - Single-slot worker thread

mod collector;
mod extract;
mod pass;
mod peaks;
mod scheduler;
mod search;
mod spectra;

pub use collector::{collect, synchronize, Window};
pub use extract::{extract, local_bins, LocalBin, SampleRecord};
pub use pass::Workspace;
pub use peaks::{detect, pick_next_below, MagnitudeSpectrum, PeakSet};
pub use scheduler::{DecodeSlot, SlotStatus, WorkSlot};
pub use search::{search_candidate, Decode, SearchOrder};
pub use spectra::Spectrogram;

use std::sync::Arc;

use tracing::info;

use crate::capture::{cycle_capture_name, CaptureWriter};
use crate::clock::Clock;
use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::source::SampleSource;

/// Local bins examined around each peak (odd, centered)
pub const WINDOW: usize = 7;

/// Symbols in one WSPR transmission
pub const NOMINAL_NUMBER_OF_SYMBOLS: usize = 162;

/// Aggregate local magnitude at or below which a slice carries no signal
pub const NOISE_FLOOR: f32 = 1.0;

/// Baseband 0 Hz sits this far above the dial frequency (Hz)
pub const AUDIO_OFFSET: f64 = 1500.0;

/// Collector loop: sync, capture, hand off, repeat until the stream ends
pub struct WsprWindow<S, C, D> {
    config: WindowConfig,
    source: S,
    clock: C,
    slot: D,
    capture: Arc<dyn CaptureWriter>,
    window: Window,
    start: f64,
}

impl<S, C, D> WsprWindow<S, C, D>
where
    S: SampleSource,
    C: Clock,
    D: DecodeSlot,
{
    pub fn new(config: WindowConfig, source: S, clock: C, slot: D, capture: Arc<dyn CaptureWriter>) -> Result<Self> {
        config.validate()?;
        let window = Window::new(&config);
        let start = clock.now();
        Ok(Self { config, source, clock, slot, capture, window, start })
    }

    /// Discard `count` floats; false once the stream runs dry
    fn drop_floats(&mut self, count: usize) -> Result<bool> {
        let consumed = self.source.discard(count)?;
        self.clock.advance(consumed / 2);
        Ok(consumed == count)
    }

    /// Wait out a busy worker, one cycle at a time
    fn drain_while_busy(&mut self) -> Result<bool> {
        if self.slot.poll() == SlotStatus::Idle {
            return Ok(true);
        }

        if !self.drop_floats(self.config.remainder_floats())? {
            return Ok(false);
        }
        while self.slot.poll() == SlotStatus::Busy {
            info!("decode still running, dropping window");
            if !self.drop_floats(self.config.period_floats())? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Run until the source is exhausted, then let the last pass finish
    pub fn run(&mut self) -> Result<()> {
        let outcome = self.cycle_loop();
        self.slot.wait();
        outcome
    }

    fn cycle_loop(&mut self) -> Result<()> {
        loop {
            if !self.drain_while_busy()? {
                break;
            }

            if !self.config.skip_sync && !synchronize(&mut self.source, &mut self.clock)? {
                break;
            }

            info!("collecting");
            let complete = collect(&mut self.source, &mut self.clock, &mut self.window, self.start)?;

            // A short final read is still captured, but never decoded
            if self.window.filled > 0 {
                let filled = &self.window.samples[..self.window.filled];
                self.capture.write(&cycle_capture_name(self.window.elapsed), filled);
            }
            if !complete {
                info!(floats = self.window.filled, "end of stream");
                break;
            }
            info!(elapsed = self.window.elapsed, "done collecting");

            match self.slot.submit(&mut self.window) {
                Ok(()) => {}
                Err(Error::SlotBusy) => info!("decode slot busy, dropping window"),
                Err(e) => return Err(e),
            }
        }
        info!("collector stopped");
        Ok(())
    }

    pub fn slot(&self) -> &D {
        &self.slot
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
