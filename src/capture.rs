//! Best-effort persistence of raw I/Q windows
//!
//! Writes are never on the decode path: failures are logged and dropped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// File name used for the window that produced the latest decode
pub const DECODE_CAPTURE_NAME: &str = "sampleFile.bin";

/// Name of the per-cycle capture, labelled by seconds since start
pub fn cycle_capture_name(elapsed_seconds: i64) -> String {
    format!("rawFile{}.bin", elapsed_seconds)
}

pub trait CaptureWriter: Send + Sync {
    fn write(&self, name: &str, samples: &[f32]);
}

/// Writes little-endian `f32` files into a directory
#[derive(Debug, Clone)]
pub struct FileCaptureWriter {
    dir: PathBuf,
}

impl FileCaptureWriter {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn try_write(&self, name: &str, samples: &[f32]) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(self.dir.join(name))?);
        for value in samples {
            out.write_all(&value.to_le_bytes())?;
        }
        out.flush()
    }
}

impl CaptureWriter for FileCaptureWriter {
    fn write(&self, name: &str, samples: &[f32]) {
        if let Err(e) = self.try_write(name, samples) {
            tracing::warn!(file = name, error = %e, "failed to write capture");
        }
    }
}

/// Discards every capture
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCaptureWriter;

impl CaptureWriter for NullCaptureWriter {
    fn write(&self, _name: &str, _samples: &[f32]) {}
}
