//! Synthetic WSPR captures for tests, benchmarks and the `wsprsim` tool

use std::f64::consts::PI;

use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use snafu::ResultExt;

use crate::error::{InvalidConfigSnafu, Result};
use crate::symbol::channel_symbols;

/// Parameters of a synthesized window
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Complex sample rate (Hz)
    pub sample_rate: usize,
    /// Samples per symbol; tones sit `sample_rate / size` Hz apart
    pub size: usize,
    /// Bin of tone 0
    pub bin: usize,
    /// Peak amplitude of the carrier
    pub amplitude: f32,
    /// Standard deviation of the noise on each of I and Q
    pub noise_sigma: f32,
    /// Complex sample at which the first symbol starts
    pub start_sample: usize,
    /// Complex samples in the output
    pub total_samples: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_rate: 375,
            size: 256,
            bin: 100,
            amplitude: 1.0,
            noise_sigma: 0.0,
            start_sample: 0,
            total_samples: 375 * 116,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Noise sigma giving `snr_db` in the 2500 Hz reference bandwidth
    pub fn sigma_for_snr(&self, snr_db: f32) -> f32 {
        let signal_power = self.amplitude * self.amplitude;
        let noise_power = signal_power / 10f32.powf(snr_db / 10.0) * self.sample_rate as f32 / 2500.0;
        (noise_power / 2.0).sqrt()
    }
}

/// Phase-continuous 4-FSK carrier for `tones`, plus seeded Gaussian noise
///
/// Output is interleaved I/Q. Symbols running past the end are cut off.
pub fn synthesize(config: &SimulationConfig, tones: &[u8]) -> Result<Vec<f32>> {
    let mut samples = vec![0.0f32; 2 * config.total_samples];
    let delta_freq = config.sample_rate as f64 / config.size as f64;
    let mut phase = 0.0f64;

    for (k, &tone) in tones.iter().enumerate() {
        let step = 2.0 * PI * (config.bin as f64 + tone as f64) * delta_freq / config.sample_rate as f64;
        for n in 0..config.size {
            let index = config.start_sample + k * config.size + n;
            if index >= config.total_samples {
                break;
            }
            samples[2 * index] = config.amplitude * phase.cos() as f32;
            samples[2 * index + 1] = config.amplitude * phase.sin() as f32;
            phase = (phase + step) % (2.0 * PI);
        }
    }

    if config.noise_sigma > 0.0 {
        let normal = Normal::new(0.0f32, config.noise_sigma)
            .map_err(|e| InvalidConfigSnafu { reason: e.to_string() }.build())?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        for value in samples.iter_mut() {
            *value += normal.sample(&mut rng);
        }
    }

    Ok(samples)
}

/// Synthesize the channel symbols of a packed payload
pub fn synthesize_message(config: &SimulationConfig, payload: &[u8]) -> Result<Vec<f32>> {
    synthesize(config, &channel_symbols(payload))
}

/// Interleaved I/Q as little-endian bytes, the raw stream format
pub fn to_le_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Write interleaved I/Q as a stereo float WAV
pub fn write_wav<P: AsRef<std::path::Path>>(path: P, samples: &[f32], sample_rate: usize) -> Result<()> {
    use crate::error::WavSnafu;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).context(WavSnafu)?;
    for &value in samples {
        writer.write_sample(value).context(WavSnafu)?;
    }
    writer.finalize().context(WavSnafu)
}
