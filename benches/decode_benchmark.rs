//! Benchmark of one full decode pass
//!
//! Times spectrogram, peak detection, extraction and the permutation search
//! on a synthesized two-minute window at several SNRs.

use std::sync::Arc;
use std::time::Instant;

use rustywspr::capture::NullCaptureWriter;
use rustywspr::message::pack_type1;
use rustywspr::simulation::{synthesize_message, SimulationConfig};
use rustywspr::{MemorySink, WindowConfig, Workspace};

fn main() {
    println!("\n=== WSPR Decode Pass Benchmark ===\n");

    let config = WindowConfig::default();
    let payload = pack_type1("K1ABC", "FN42", 37).expect("Failed to pack");

    // (name, snr_db); None is noiseless
    let cases = vec![
        ("Clean", None),
        ("Strong", Some(0.0f32)),
        ("Typical", Some(-15.0)),
        ("Weak", Some(-24.0)),
    ];

    for (name, snr_db) in cases {
        let mut simulation = SimulationConfig {
            sample_rate: config.sample_rate,
            size: config.size,
            bin: 100,
            total_samples: config.sample_buffer_size() / 2,
            seed: 42,
            ..Default::default()
        };
        if let Some(snr) = snr_db {
            simulation.noise_sigma = simulation.sigma_for_snr(snr);
        }
        let samples = synthesize_message(&simulation, &payload).expect("Failed to synthesize");

        let sink = Arc::new(MemorySink::new());
        let mut workspace = Workspace::new(config.clone(), sink, Arc::new(NullCaptureWriter));
        workspace.window_mut().samples.copy_from_slice(&samples);

        let start = Instant::now();
        let spots = workspace.decode_pass();
        let elapsed = start.elapsed();

        println!("Test: {} ({})", name, snr_db.map_or("no noise".to_string(), |s| format!("{} dB SNR", s)));
        println!("  {} spot(s) in {:.2?}", spots.len(), elapsed);
        for spot in &spots {
            println!("  {}", spot);
        }
        println!();
    }
}
