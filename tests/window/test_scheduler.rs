//! Collector backpressure against a scripted decode slot

use std::sync::Arc;

use rustywspr::capture::NullCaptureWriter;
use rustywspr::clock::StreamClock;
use rustywspr::source::MemorySource;
use rustywspr::window::{DecodeSlot, SlotStatus, Window};
use rustywspr::{Error, Result, WindowConfig, WsprWindow};

#[path = "../test_utils.rs"]
mod test_utils;
use test_utils::{init_test_tracing, ramp};

/// Reports busy for a scripted number of polls after each submit
struct ScriptedSlot {
    busy_polls: Vec<usize>,
    remaining: usize,
    /// First value of every submitted window
    submitted: Vec<f32>,
    polls: usize,
    waited: bool,
}

impl ScriptedSlot {
    fn new(busy_polls: Vec<usize>) -> Self {
        Self { busy_polls, remaining: 0, submitted: Vec::new(), polls: 0, waited: false }
    }
}

impl DecodeSlot for ScriptedSlot {
    fn poll(&mut self) -> SlotStatus {
        self.polls += 1;
        if self.remaining > 0 {
            self.remaining -= 1;
            SlotStatus::Busy
        } else {
            SlotStatus::Idle
        }
    }

    fn submit(&mut self, window: &mut Window) -> Result<()> {
        if self.remaining > 0 {
            return Err(Error::SlotBusy);
        }
        self.submitted.push(window.samples[0]);
        self.remaining = self.busy_polls.get(self.submitted.len() - 1).copied().unwrap_or(0);
        Ok(())
    }

    fn wait(&mut self) {
        self.remaining = 0;
        self.waited = true;
    }
}

/// 10 Hz stream: 2320 floats per window, 80 remainder, 2400 per cycle
fn config() -> WindowConfig {
    WindowConfig { sample_rate: 10, size: 7, number: 1, skip_sync: true, ..Default::default() }
}

fn run(busy_polls: Vec<usize>, floats: usize) -> WsprWindow<MemorySource, StreamClock, ScriptedSlot> {
    init_test_tracing();
    let config = config();
    let clock = StreamClock::new(0.0, config.sample_rate);
    let slot = ScriptedSlot::new(busy_polls);
    let mut window =
        WsprWindow::new(config, MemorySource::new(ramp(floats)), clock, slot, Arc::new(NullCaptureWriter)).unwrap();
    window.run().unwrap();
    window
}

#[test]
fn test_busy_worker_drops_remainder_then_whole_cycles() {
    let config = config();
    let (w, r, p) = (config.sample_buffer_size(), config.remainder_floats(), config.period_floats());
    assert_eq!((w, r, p), (2320, 80, 2400));

    // First pass outlives two more cycles, second finishes at once
    let floats = 3 * w + r + 2 * p + 100;
    let window = run(vec![3, 0], floats);
    let slot = window.slot();

    assert_eq!(
        slot.submitted,
        vec![0.0, (w + r + 2 * p) as f32, (2 * w + r + 2 * p) as f32]
    );
    assert!(slot.waited);
    assert_eq!(window.source().remaining(), 0);
}

#[test]
fn test_idle_worker_means_back_to_back_windows() {
    let config = config();
    let w = config.sample_buffer_size();
    let window = run(vec![], 3 * w + 10);

    assert_eq!(window.slot().submitted, vec![0.0, w as f32, (2 * w) as f32]);
}

#[test]
fn test_stream_end_while_worker_busy() {
    let config = config();
    let (w, r, p) = (config.sample_buffer_size(), config.remainder_floats(), config.period_floats());

    // Worker never finishes within the stream
    let window = run(vec![usize::MAX], w + r + 3 * p + 5);
    let slot = window.slot();

    assert_eq!(slot.submitted, vec![0.0]);
    assert!(slot.waited);
    // Remainder, then one poll per dropped cycle until the partial one
    assert_eq!(slot.polls, 1 + 1 + 4);
    assert_eq!(window.source().remaining(), 0);
}

#[test]
fn test_partial_window_is_not_submitted() {
    let config = config();
    let window = run(vec![], config.sample_buffer_size() - 1);
    assert!(window.slot().submitted.is_empty());
    assert!(window.slot().waited);
}
