//! Window capture and even-minute alignment

use tracing::trace;

use crate::clock::Clock;
use crate::config::WindowConfig;
use crate::error::Result;
use crate::source::SampleSource;

/// One processing window of interleaved I/Q floats
#[derive(Debug, Clone)]
pub struct Window {
    pub samples: Vec<f32>,
    /// Clock time of the first sample (unix seconds)
    pub capture_time: f64,
    /// Whole seconds between collector start and the first sample
    pub elapsed: i64,
    /// Floats written by the last `collect`
    pub filled: usize,
}

impl Window {
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            samples: vec![0.0; config.sample_buffer_size()],
            capture_time: 0.0,
            elapsed: 0,
            filled: 0,
        }
    }

    /// Complex samples held
    pub fn len(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Drop one complex sample; false if the stream ended
fn skip_pair<S: SampleSource, C: Clock>(source: &mut S, clock: &mut C) -> Result<bool> {
    let mut pair = [0.0f32; 2];
    let got = source.read(&mut pair)?;
    clock.advance(got / 2);
    Ok(got == 2)
}

/// Discard samples until an odd minute turns into an even one
///
/// Returns false if the stream ended first.
pub fn synchronize<S: SampleSource, C: Clock>(source: &mut S, clock: &mut C) -> Result<bool> {
    trace!(minute = clock.minute(), "synchronizing");

    while clock.minute() % 2 == 0 {
        if !skip_pair(source, clock)? {
            return Ok(false);
        }
    }
    while clock.minute() % 2 != 0 {
        if !skip_pair(source, clock)? {
            return Ok(false);
        }
    }

    trace!(time = clock.now(), "aligned to even minute");
    Ok(true)
}

/// Fill `window` from the source, labelling it with the clock
///
/// Returns false on a short read; the partial window must not be processed.
/// `window.filled` holds the number of floats actually read.
pub fn collect<S: SampleSource, C: Clock>(
    source: &mut S,
    clock: &mut C,
    window: &mut Window,
    start: f64,
) -> Result<bool> {
    window.capture_time = clock.now();
    window.elapsed = (window.capture_time - start).floor() as i64;

    let got = source.read(&mut window.samples)?;
    clock.advance(got / 2);
    window.filled = got;
    Ok(got == window.samples.len())
}
