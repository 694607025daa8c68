//! Spot reports

use std::fmt::Display;
use std::sync::Mutex;

use tracing::info;

use crate::message::WsprMessage;

/// A decoded transmission ready to report
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    pub call_loc_pow: String,
    pub call: String,
    pub locator: String,
    pub power: i32,
    pub callsign: String,
    /// Absolute carrier frequency (Hz)
    pub frequency: f64,
    /// Start of the capture window (unix seconds)
    pub capture_time: f64,
    pub peak_index: usize,
    pub bin: usize,
    pub shift: usize,
    pub window_offset: usize,
    pub permutation: usize,
}

impl Spot {
    pub fn new(message: WsprMessage, frequency: f64, capture_time: f64) -> Self {
        Self {
            call_loc_pow: message.call_loc_pow,
            call: message.call,
            locator: message.locator,
            power: message.power,
            callsign: message.callsign,
            frequency,
            capture_time,
            peak_index: 0,
            bin: 0,
            shift: 0,
            window_offset: 0,
            permutation: 0,
        }
    }

    /// UTC `HHMM` of the capture
    pub fn utc_hhmm(&self) -> String {
        let minutes = (self.capture_time / 60.0).floor() as i64;
        format!("{:02}{:02}", minutes.div_euclid(60).rem_euclid(24), minutes.rem_euclid(60))
    }
}

impl Display for Spot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:.6} {} (peak {} bin {} shift {} offset {} perm {})",
            self.utc_hhmm(),
            self.frequency / 1e6,
            self.call_loc_pow,
            self.peak_index,
            self.bin,
            self.shift,
            self.window_offset,
            self.permutation
        )
    }
}

/// Destination for spots, shared with the decode worker
pub trait SpotSink: Send + Sync {
    fn report(&self, spot: &Spot);
}

/// Prints spots to stdout and the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SpotSink for LogSink {
    fn report(&self, spot: &Spot) {
        println!("{}", spot);
        info!(
            callsign = %spot.callsign,
            locator = %spot.locator,
            power = spot.power,
            frequency = spot.frequency,
            "spot"
        );
    }
}

/// Collects spots in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    spots: Mutex<Vec<Spot>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spots(&self) -> Vec<Spot> {
        match self.spots.lock() {
            Ok(spots) => spots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SpotSink for MemorySink {
    fn report(&self, spot: &Spot) {
        match self.spots.lock() {
            Ok(mut spots) => spots.push(spot.clone()),
            Err(poisoned) => poisoned.into_inner().push(spot.clone()),
        }
    }
}
