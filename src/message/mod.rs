//! WSPR message packing and unpacking
//!
//! A WSPR payload is 50 bits: a 28-bit callsign field `n1` followed by a
//! 22-bit field `m1` holding a 15-bit locator/prefix/hash and a 7-bit power
//! code. Three message types share that layout:
//!
//! - Type 1: standard callsign, 4-character locator, power
//! - Type 2: compound callsign (prefix or suffix), power, no locator
//! - Type 3: hashed callsign, 6-character locator, power
//!
//! Packed bytes are MSB first; bytes 7..11 carry the zero tail.

mod hash;
mod pack;
mod unpack;

use std::fmt::Display;

use snafu::Snafu;

pub use hash::{callsign_hash, hashlittle, CallsignHashCache};
pub use pack::{pack_type1, pack_type3};
pub use unpack::unpack;

/// Bytes holding the 81 message and tail bits
pub const PACKED_BYTES: usize = 11;

/// Powers (dBm) a type 1 message can carry end in 0, 3 or 7
pub fn is_valid_power(power: i32) -> bool {
    (0..=60).contains(&power) && matches!(power % 10, 0 | 3 | 7)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Standard,
    Compound,
    Hashed,
}

/// Unpacked WSPR message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsprMessage {
    /// Display form, e.g. `K1ABC FN42 37`
    pub call_loc_pow: String,
    /// Callsign field as transmitted in `n1` (empty for type 3)
    pub call: String,
    /// Maidenhead locator, 4 or 6 characters (empty for type 2)
    pub locator: String,
    /// Transmit power (dBm)
    pub power: i32,
    /// Full callsign with prefix/suffix, or `<CALL>`/`<...>` for hashed calls
    pub callsign: String,
    pub kind: MessageKind,
}

impl Display for WsprMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.call_loc_pow)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum PackError {
    #[snafu(display("\"{callsign}\" cannot be packed as a WSPR callsign"))]
    InvalidCallsign { callsign: String },

    #[snafu(display("\"{locator}\" is not a valid Maidenhead locator"))]
    InvalidLocator { locator: String },

    #[snafu(display("{power} dBm is not a valid WSPR power"))]
    InvalidPower { power: i32 },
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum UnpackError {
    #[snafu(display("callsign field {packed} out of range"))]
    InvalidCallsignField { packed: u32 },

    #[snafu(display("locator field {packed} out of range"))]
    InvalidLocatorField { packed: u32 },

    #[snafu(display("power code {code} is not a valid message type"))]
    InvalidPowerCode { code: i32 },

    #[snafu(display("prefix field {packed} out of range"))]
    InvalidPrefixField { packed: u32 },
}

/// Character code used by the callsign packing: digits, letters, then space
pub(crate) fn char_code(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        ' ' => Some(36),
        _ => None,
    }
}

pub(crate) fn code_char(code: u32) -> char {
    match code {
        0..=9 => (b'0' + code as u8) as char,
        10..=35 => (b'A' + (code - 10) as u8) as char,
        _ => ' ',
    }
}

/// Split 50 message bits into the 11 packed bytes
pub(crate) fn fields_to_bytes(n1: u32, m1: u32) -> [u8; PACKED_BYTES] {
    let mut data = [0u8; PACKED_BYTES];
    data[0] = (n1 >> 20) as u8;
    data[1] = (n1 >> 12) as u8;
    data[2] = (n1 >> 4) as u8;
    data[3] = (((n1 & 0x0f) << 4) | ((m1 >> 18) & 0x0f)) as u8;
    data[4] = (m1 >> 10) as u8;
    data[5] = (m1 >> 2) as u8;
    data[6] = ((m1 & 0x03) << 6) as u8;
    data
}

pub(crate) fn bytes_to_fields(data: &[u8]) -> (u32, u32) {
    let d = |i: usize| data[i] as u32;
    let n1 = (d(0) << 20) | (d(1) << 12) | (d(2) << 4) | (d(3) >> 4);
    let m1 = ((d(3) & 0x0f) << 18) | (d(4) << 10) | (d(5) << 2) | (d(6) >> 6);
    (n1, m1)
}
