//! Sample sources feeding the window collector
//!
//! Every source yields interleaved complex samples (I, Q, I, Q, ...) as `f32`.
//! A read returning fewer values than requested means the stream is exhausted.

use std::io::{ErrorKind, Read};
use std::path::Path;

use snafu::ResultExt;

use crate::error::{IoSnafu, Result, WavSnafu};

/// Chunk used when dropping samples that will never be processed
const DISCARD_CHUNK: usize = 8192;

/// A blocking source of interleaved I/Q floats
pub trait SampleSource {
    /// Fill `buf` as far as the stream allows, returning the number of values read
    fn read(&mut self, buf: &mut [f32]) -> Result<usize>;

    /// Read and drop `count` values, returning how many were actually consumed
    fn discard(&mut self, count: usize) -> Result<usize> {
        let mut scratch = [0.0f32; DISCARD_CHUNK];
        let mut consumed = 0;
        while consumed < count {
            let want = (count - consumed).min(DISCARD_CHUNK);
            let got = self.read(&mut scratch[..want])?;
            consumed += got;
            if got < want {
                break;
            }
        }
        Ok(consumed)
    }
}

/// Little-endian `f32` stream, typically stdin from an SDR front end
pub struct ReaderSource<R> {
    inner: R,
    bytes: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, bytes: Vec::new() }
    }
}

impl<R: Read> SampleSource for ReaderSource<R> {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let want = buf.len() * 4;
        self.bytes.resize(want, 0);

        let mut filled = 0;
        while filled < want {
            match self.inner.read(&mut self.bytes[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context(IoSnafu),
            }
        }

        // A trailing partial float is dropped with the rest of the short read
        let count = filled / 4;
        for (value, chunk) in buf.iter_mut().zip(self.bytes[..count * 4].chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(count)
    }
}

/// Stereo WAV file holding I on the left channel and Q on the right
pub struct WavSource {
    samples: std::vec::IntoIter<f32>,
}

impl WavSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path).context(WavSnafu)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .context(WavSnafu)?,
            hound::SampleFormat::Int => reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / (1u32 << (spec.bits_per_sample - 1)) as f32))
                .collect::<std::result::Result<_, _>>()
                .context(WavSnafu)?,
        };

        if spec.channels != 2 {
            tracing::warn!(channels = spec.channels, "WAV input is not stereo I/Q, reading values as interleaved");
        }

        Ok(Self { samples: samples.into_iter() })
    }
}

impl SampleSource for WavSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let mut count = 0;
        for (slot, value) in buf.iter_mut().zip(&mut self.samples) {
            *slot = value;
            count += 1;
        }
        Ok(count)
    }
}

/// In-memory source, mainly for tests and simulations
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<f32>,
    position: usize,
}

impl MemorySource {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data, position: 0 }
    }

    /// Values consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl SampleSource for MemorySource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}
