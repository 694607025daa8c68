//! WSPR Window Decoder
//!
//! Reads interleaved little-endian `f32` I/Q at 375 Hz from stdin (or a stereo
//! WAV), captures one window per even-minute cycle and prints a line per spot.
//!
//! **Usage**:
//! ```bash
//! rx_sdr ... | csdr ... | wsprwindow --dial-freq 14095600
//! wsprwindow --wav capture.wav --skip-sync --stream-clock 1700000040 --no-capture
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rustywspr::capture::{CaptureWriter, FileCaptureWriter, NullCaptureWriter};
use rustywspr::clock::{Clock, StreamClock, SystemClock};
use rustywspr::source::{ReaderSource, SampleSource, WavSource};
use rustywspr::tracing_init::init_tracing;
use rustywspr::{LogSink, WindowConfig, WorkSlot, WsprWindow};

#[derive(Parser)]
#[command(name = "wsprwindow")]
#[command(about = "Decode WSPR transmissions from a complex baseband stream")]
struct Cli {
    /// Receiver dial frequency (Hz)
    #[arg(long, default_value_t = 14_095_600.0)]
    dial_freq: f64,

    /// Peak bins examined per cycle
    #[arg(long, default_value_t = 9)]
    peaks: usize,

    /// FFT length (complex samples)
    #[arg(long, default_value_t = 256)]
    fft_size: usize,

    /// Directory for raw capture files
    #[arg(long, default_value = ".")]
    prefix: PathBuf,

    /// Do not wait for an even minute before capturing
    #[arg(long)]
    skip_sync: bool,

    /// Take time from the sample count, starting at this unix time
    #[arg(long, value_name = "UNIX_SECONDS")]
    stream_clock: Option<f64>,

    /// Do not write raw capture files
    #[arg(long)]
    no_capture: bool,

    /// Report each message once per cycle, from its strongest peak
    #[arg(long)]
    dedup: bool,

    /// Read I/Q from a stereo WAV instead of stdin
    #[arg(long, value_name = "FILE")]
    wav: Option<PathBuf>,
}

fn run<S: SampleSource, C: Clock>(
    config: WindowConfig,
    source: S,
    clock: C,
    capture: Arc<dyn CaptureWriter>,
) -> rustywspr::Result<()> {
    let slot = WorkSlot::new(config.clone(), Arc::new(LogSink), capture.clone());
    let mut window = WsprWindow::new(config, source, clock, slot, capture)?;
    window.run()
}

fn with_clock<S: SampleSource>(
    cli: &Cli,
    config: WindowConfig,
    source: S,
    capture: Arc<dyn CaptureWriter>,
) -> rustywspr::Result<()> {
    match cli.stream_clock {
        Some(start) => {
            let clock = StreamClock::new(start, config.sample_rate);
            run(config, source, clock, capture)
        }
        None => run(config, source, SystemClock, capture),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let config = WindowConfig {
        size: cli.fft_size,
        number: cli.peaks,
        prefix: cli.prefix.clone(),
        dial_freq: cli.dial_freq,
        skip_sync: cli.skip_sync,
        dedup_spots: cli.dedup,
        ..Default::default()
    };
    config.validate()?;

    let capture: Arc<dyn CaptureWriter> = if cli.no_capture {
        Arc::new(NullCaptureWriter)
    } else {
        Arc::new(FileCaptureWriter::new(config.prefix.clone()))
    };

    match &cli.wav {
        Some(path) => with_clock(&cli, config, WavSource::open(path)?, capture)?,
        None => {
            let stdin = std::io::stdin().lock();
            with_clock(&cli, config, ReaderSource::new(stdin), capture)?
        }
    }

    Ok(())
}
