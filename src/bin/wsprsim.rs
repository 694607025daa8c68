//! WSPR Capture Simulator
//!
//! Packs a message, generates its 4-FSK waveform at a chosen bin with noise
//! and writes one two-minute cycle of I/Q for `wsprwindow` to decode.
//!
//! **Usage**:
//! ```bash
//! wsprsim "K1ABC FN42 37" --bin 100 --snr -20 --output cycle.bin
//! wsprsim "K1ABC FN42 37" --output cycle.wav
//! ```

use std::path::PathBuf;

use clap::Parser;

use rustywspr::message::{pack_type1, pack_type3};
use rustywspr::simulation::{synthesize_message, to_le_bytes, write_wav, SimulationConfig};
use rustywspr::WindowConfig;

#[derive(Parser)]
#[command(name = "wsprsim")]
#[command(about = "Synthesize a WSPR capture")]
struct Cli {
    /// Message: "CALL GRID4 POWER", or "<CALL> GRID6 POWER" for a hashed call
    message: String,

    /// FFT bin of tone 0
    #[arg(long, default_value_t = 100)]
    bin: usize,

    /// SNR in 2500 Hz (dB); omit for a noiseless signal
    #[arg(long)]
    snr: Option<f32>,

    /// Noise seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Delay of the first symbol into the cycle (s)
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Output file; `.wav` writes a stereo float WAV, anything else raw `f32`
    #[arg(long, short, default_value = "wsprsim.bin")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let fields: Vec<&str> = cli.message.split_whitespace().collect();
    let [call, grid, power] = fields[..] else {
        return Err(format!("expected CALL GRID POWER, got \"{}\"", cli.message).into());
    };
    let power: i32 = power.parse()?;

    let payload = match call.strip_prefix('<').and_then(|c| c.strip_suffix('>')) {
        Some(hashed) => pack_type3(hashed, grid, power)?,
        None => pack_type1(call, grid, power)?,
    };

    let window = WindowConfig::default();
    let mut config = SimulationConfig {
        sample_rate: window.sample_rate,
        size: window.size,
        bin: cli.bin,
        start_sample: (cli.start * window.sample_rate as f64) as usize,
        total_samples: window.sample_rate * window.period_seconds,
        seed: cli.seed,
        ..Default::default()
    };
    if let Some(snr) = cli.snr {
        config.noise_sigma = config.sigma_for_snr(snr);
    }

    let samples = synthesize_message(&config, &payload)?;

    let is_wav = cli.output.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if is_wav {
        write_wav(&cli.output, &samples, config.sample_rate)?;
    } else {
        std::fs::write(&cli.output, to_le_bytes(&samples))?;
    }

    println!(
        "Wrote {} s of I/Q to {} ({:.1} Hz above baseband 0)",
        window.period_seconds,
        cli.output.display(),
        cli.bin as f64 * window.delta_freq()
    );
    Ok(())
}
