//! End-to-end decode of synthesized captures

use std::sync::Arc;

use rustywspr::capture::{FileCaptureWriter, NullCaptureWriter, DECODE_CAPTURE_NAME};
use rustywspr::clock::StreamClock;
use rustywspr::source::{MemorySource, ReaderSource};
use rustywspr::window::AUDIO_OFFSET;
use rustywspr::{MemorySink, WindowConfig, WorkSlot, Workspace, WsprWindow};

#[path = "../test_utils.rs"]
mod test_utils;
use test_utils::{init_test_tracing, noise, reference_cycle};

const TONE0_BIN: usize = 100;

fn config() -> WindowConfig {
    WindowConfig { number: 4, ..Default::default() }
}

fn decode_reference(config: &WindowConfig, sink: Arc<MemorySink>) -> (Workspace, Vec<rustywspr::Spot>) {
    let mut workspace = Workspace::new(config.clone(), sink, Arc::new(NullCaptureWriter));

    let cycle = reference_cycle(config, TONE0_BIN, 0.1, 1);
    let window = workspace.window_mut();
    window.samples.copy_from_slice(&cycle[..config.sample_buffer_size()]);
    window.capture_time = 1_700_000_040.0;

    let spots = workspace.decode_pass();
    (workspace, spots)
}

#[test]
fn test_workspace_decodes_reference_message() {
    init_test_tracing();
    let config = config();
    let sink = Arc::new(MemorySink::new());
    let (workspace, spots) = decode_reference(&config, sink.clone());

    // Tone 2 carries the most symbols, then tones 0, 3 and 1
    let peaks = [TONE0_BIN + 2, TONE0_BIN, TONE0_BIN + 3, TONE0_BIN + 1];
    assert_eq!(workspace.peaks().bins(), &peaks);

    // Every peak decodes and is reported
    assert_eq!(spots.len(), peaks.len());
    assert_eq!(sink.spots(), spots);
    for (index, spot) in spots.iter().enumerate() {
        assert_eq!(spot.peak_index, index);
        assert_eq!(spot.bin, peaks[index]);
        assert_eq!(spot.call_loc_pow, "K1ABC FN42 37");
        assert_eq!(spot.capture_time, 1_700_000_040.0);
    }

    // The spot on the injected tone 0 bin carries its exact frequency
    let spot = spots.iter().find(|s| s.bin == TONE0_BIN).expect("spot at tone 0 bin");
    assert_eq!(spot.peak_index, 1);
    assert_eq!(spot.callsign, "K1ABC");
    assert_eq!(spot.locator, "FN42");
    assert_eq!(spot.power, 37);
    assert_eq!((spot.shift, spot.window_offset, spot.permutation), (0, 0, 0));

    let expected = config.dial_freq + AUDIO_OFFSET + TONE0_BIN as f64 * config.delta_freq();
    assert!((spot.frequency - expected).abs() < 1e-6, "frequency {} != {}", spot.frequency, expected);
}

#[test]
fn test_dedup_reports_message_once() {
    init_test_tracing();
    let config = WindowConfig { dedup_spots: true, ..config() };
    let sink = Arc::new(MemorySink::new());
    let (_, spots) = decode_reference(&config, sink.clone());

    assert_eq!(spots.len(), 1);
    assert_eq!(sink.spots(), spots);
    assert_eq!(spots[0].peak_index, 0);
    assert_eq!(spots[0].bin, TONE0_BIN + 2);
}

#[test]
fn test_delayed_start_is_found_by_window_offset() {
    init_test_tracing();
    let config = WindowConfig { number: 1, shifts: 20, ..Default::default() };
    let sink = Arc::new(MemorySink::new());
    let mut workspace = Workspace::new(config.clone(), sink.clone(), Arc::new(NullCaptureWriter));

    // Three symbols of noise before the transmission starts
    let mut samples = noise(&config, 3, 0.1, 5)[..3 * 2 * config.size].to_vec();
    samples.extend(reference_cycle(&config, TONE0_BIN, 0.1, 2));
    samples.truncate(config.sample_buffer_size());
    workspace.window_mut().samples.copy_from_slice(&samples);

    let spots = workspace.decode_pass();
    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].window_offset, 3);
    assert_eq!(spots[0].call_loc_pow, "K1ABC FN42 37");
}

#[test]
fn test_noise_only_window_yields_no_spots() {
    init_test_tracing();
    let config = WindowConfig { number: 2, shifts: 20, ..Default::default() };
    let sink = Arc::new(MemorySink::new());
    let mut workspace = Workspace::new(config.clone(), sink.clone(), Arc::new(NullCaptureWriter));

    let samples = noise(&config, config.processing_seconds, 0.5, 11);
    workspace.window_mut().samples.copy_from_slice(&samples);

    assert!(workspace.decode_pass().is_empty());
    assert!(sink.spots().is_empty());
}

#[test]
fn test_collector_syncs_captures_and_decodes() {
    init_test_tracing();
    let config = WindowConfig { number: 2, shifts: 20, ..Default::default() };
    let dir = tempfile::tempdir().unwrap();
    let capture = Arc::new(FileCaptureWriter::new(dir.path()));
    let sink = Arc::new(MemorySink::new());
    let slot = WorkSlot::new(config.clone(), sink.clone(), capture.clone());

    // Stream starts 30 s into odd minute 11; the transmission starts on minute 12
    let mut stream = noise(&config, 30, 0.1, 3);
    stream.extend(reference_cycle(&config, TONE0_BIN, 0.1, 4));
    let clock = StreamClock::new(690.0, config.sample_rate);

    let mut window = WsprWindow::new(config.clone(), MemorySource::new(stream), clock, slot, capture).unwrap();
    window.run().unwrap();

    let spots = sink.spots();
    assert_eq!(spots.len(), 2);
    assert!(spots.iter().all(|s| s.call_loc_pow == "K1ABC FN42 37" && s.capture_time == 720.0));
    assert_eq!(spots.iter().map(|s| s.bin).collect::<Vec<_>>(), vec![TONE0_BIN + 2, TONE0_BIN]);
    assert_eq!(window.slot().passes(), 1);

    // Cycle capture is labelled by seconds since start; the decode capture holds the same window
    let cycle = std::fs::read(dir.path().join("rawFile30.bin")).unwrap();
    let decoded = std::fs::read(dir.path().join(DECODE_CAPTURE_NAME)).unwrap();
    assert_eq!(cycle.len(), config.sample_buffer_size() * 4);
    assert_eq!(cycle, decoded);
}

#[test]
fn test_raw_stream_input() {
    init_test_tracing();
    let config = WindowConfig { number: 1, shifts: 20, skip_sync: true, ..Default::default() };
    let sink = Arc::new(MemorySink::new());
    let slot = WorkSlot::new(config.clone(), sink.clone(), Arc::new(NullCaptureWriter));

    let bytes = rustywspr::simulation::to_le_bytes(&reference_cycle(&config, TONE0_BIN, 0.1, 6));
    let source = ReaderSource::new(&bytes[..]);
    let clock = StreamClock::new(1_700_000_040.0, config.sample_rate);

    let mut window = WsprWindow::new(config, source, clock, slot, Arc::new(NullCaptureWriter)).unwrap();
    window.run().unwrap();

    let spots = sink.spots();
    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].utc_hhmm(), "2214");
}

#[test]
fn test_short_final_read_is_captured_but_not_decoded() {
    init_test_tracing();
    let config = WindowConfig { number: 1, shifts: 20, skip_sync: true, ..Default::default() };
    let dir = tempfile::tempdir().unwrap();
    let capture = Arc::new(FileCaptureWriter::new(dir.path()));
    let sink = Arc::new(MemorySink::new());
    let slot = WorkSlot::new(config.clone(), sink.clone(), capture.clone());

    let stream = noise(&config, 30, 0.1, 8);
    let clock = StreamClock::new(0.0, config.sample_rate);
    let mut window = WsprWindow::new(config.clone(), MemorySource::new(stream.clone()), clock, slot, capture).unwrap();
    window.run().unwrap();

    assert_eq!(window.slot().passes(), 0);
    assert!(sink.spots().is_empty());

    let partial = std::fs::read(dir.path().join("rawFile0.bin")).unwrap();
    assert_eq!(partial, rustywspr::simulation::to_le_bytes(&stream));
    assert!(!dir.path().join(DECODE_CAPTURE_NAME).exists());
}
