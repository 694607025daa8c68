use snafu::{ensure, OptionExt};

use super::{
    callsign_hash, char_code, fields_to_bytes, is_valid_power, InvalidCallsignSnafu, InvalidLocatorSnafu,
    InvalidPowerSnafu, PackError, PACKED_BYTES,
};

/// Pack a six-character callsign into 28 bits
///
/// The third character must be the call area digit; calls with the digit in
/// second place are shifted right by one space first (`K1ABC` -> ` K1ABC`).
pub(crate) fn pack_call(callsign: &str) -> Result<u32, PackError> {
    let invalid = || InvalidCallsignSnafu { callsign: callsign.to_string() };
    let upper = callsign.trim().to_ascii_uppercase();
    let chars: Vec<char> = upper.chars().collect();

    let digit_at = |i: usize| chars.get(i).map_or(false, |c| c.is_ascii_digit());
    let mut padded: Vec<char> = if digit_at(2) {
        chars.clone()
    } else if digit_at(1) {
        std::iter::once(' ').chain(chars.iter().copied()).collect()
    } else {
        return invalid().fail();
    };
    ensure!(padded.len() <= 6, invalid());
    padded.resize(6, ' ');

    let code = |c: char| char_code(c).context(invalid());
    let c0 = code(padded[0])?;
    let c1 = code(padded[1])?;
    let c2 = code(padded[2])?;
    ensure!(c1 < 36 && c2 < 10, invalid());

    let mut n = c0;
    n = n * 36 + c1;
    n = n * 10 + c2;
    for &c in &padded[3..] {
        let c = code(c)?;
        ensure!(c >= 10, invalid());
        n = n * 27 + (c - 10);
    }
    Ok(n)
}

/// 15-bit encoding of a four-character locator
pub(crate) fn pack_grid(locator: &str) -> Result<u32, PackError> {
    let invalid = || InvalidLocatorSnafu { locator: locator.to_string() };
    let g: Vec<u8> = locator.to_ascii_uppercase().bytes().collect();
    ensure!(g.len() == 4, invalid());
    ensure!(
        (b'A'..=b'R').contains(&g[0]) && (b'A'..=b'R').contains(&g[1]) && g[2].is_ascii_digit() && g[3].is_ascii_digit(),
        invalid()
    );

    let field_lon = (g[0] - b'A') as u32;
    let field_lat = (g[1] - b'A') as u32;
    let square_lon = (g[2] - b'0') as u32;
    let square_lat = (g[3] - b'0') as u32;
    Ok((179 - 10 * field_lon - square_lon) * 180 + 10 * field_lat + square_lat)
}

/// Pack a type 1 message (standard callsign, 4-character locator, power)
pub fn pack_type1(callsign: &str, locator: &str, power: i32) -> Result<[u8; PACKED_BYTES], PackError> {
    ensure!(is_valid_power(power), InvalidPowerSnafu { power });
    let n1 = pack_call(callsign)?;
    let m1 = pack_grid(locator)? * 128 + power as u32 + 64;
    Ok(fields_to_bytes(n1, m1))
}

/// Pack a type 3 message (hashed callsign, 6-character locator, power)
///
/// The locator travels in the callsign field, rotated left by one character.
pub fn pack_type3(callsign: &str, locator: &str, power: i32) -> Result<[u8; PACKED_BYTES], PackError> {
    ensure!(is_valid_power(power), InvalidPowerSnafu { power });
    let invalid = || InvalidLocatorSnafu { locator: locator.to_string() };
    let grid = locator.to_ascii_uppercase();
    ensure!(grid.len() == 6 && grid.is_ascii(), invalid());
    pack_grid(&grid[..4])?;
    ensure!(grid[4..].bytes().all(|b| (b'A'..=b'X').contains(&b)), invalid());

    let rotated = format!("{}{}", &grid[1..], &grid[..1]);
    let n1 = pack_call(&rotated).map_err(|_| invalid().build())?;
    let ntype = -(power + 1);
    let m1 = callsign_hash(&callsign.trim().to_ascii_uppercase()) as u32 * 128 + (ntype + 64) as u32;
    Ok(fields_to_bytes(n1, m1))
}
