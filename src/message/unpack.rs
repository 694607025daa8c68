use snafu::ensure;

use super::{
    bytes_to_fields, code_char, CallsignHashCache, InvalidCallsignFieldSnafu, InvalidLocatorFieldSnafu,
    InvalidPowerCodeSnafu, InvalidPrefixFieldSnafu, MessageKind, UnpackError, WsprMessage,
};

/// Largest valid callsign field plus one: 37 * 36 * 10 * 27^3
const CALL_FIELD_LIMIT: u32 = 262_177_560;

/// Locator fields at or above this encode no 4-character square
const GRID_FIELD_LIMIT: u32 = 32_400;

/// Prefix fields below this are 1-3 character prefixes, above are suffixes
const SUFFIX_BASE: u32 = 60_000;

/// Six raw characters of the callsign field, spaces kept
fn unpack_call_chars(n1: u32) -> Result<[char; 6], UnpackError> {
    ensure!(n1 < CALL_FIELD_LIMIT, InvalidCallsignFieldSnafu { packed: n1 });
    let mut n = n1;
    let mut chars = [' '; 6];
    for slot in chars[3..].iter_mut().rev() {
        *slot = code_char(n % 27 + 10);
        n /= 27;
    }
    chars[2] = code_char(n % 10);
    n /= 10;
    chars[1] = code_char(n % 36);
    n /= 36;
    chars[0] = code_char(n);
    Ok(chars)
}

fn unpack_call(n1: u32) -> Result<String, UnpackError> {
    let chars = unpack_call_chars(n1)?;
    Ok(chars.iter().collect::<String>().trim().to_string())
}

fn unpack_grid(ngrid: u32) -> Result<String, UnpackError> {
    ensure!(ngrid < GRID_FIELD_LIMIT, InvalidLocatorFieldSnafu { packed: ngrid });
    let lon = 179 - ngrid / 180;
    let lat = ngrid % 180;
    let letter = |v: u32| (b'A' + v as u8) as char;
    let digit = |v: u32| (b'0' + v as u8) as char;
    Ok([letter(lon / 10), letter(lat / 10), digit(lon % 10), digit(lat % 10)].iter().collect())
}

/// Attach the prefix or suffix carried by a type 2 message to `call`
fn apply_prefix(nprefix: u32, call: &str) -> Result<String, UnpackError> {
    if nprefix < SUFFIX_BASE {
        let mut n = nprefix;
        let mut prefix = [' '; 3];
        for slot in prefix.iter_mut().rev() {
            *slot = code_char(n % 37);
            n /= 37;
        }
        let prefix: String = prefix.iter().collect();
        return Ok(format!("{}/{}", prefix.trim(), call));
    }

    let nc = nprefix - SUFFIX_BASE;
    match nc {
        0..=9 => Ok(format!("{}/{}", call, nc)),
        10..=35 => Ok(format!("{}/{}", call, code_char(nc))),
        36..=125 => Ok(format!("{}/{}{}", call, (nc - 26) / 10, (nc - 26) % 10)),
        _ => InvalidPrefixFieldSnafu { packed: nprefix }.fail(),
    }
}

/// Unpack the 50 message bits at the front of `payload`
///
/// Type 1 and type 2 callsigns are recorded in `hashes`; type 3 hashes are
/// resolved from it when possible and shown as `<...>` otherwise.
pub fn unpack(payload: &[u8], hashes: Option<&mut CallsignHashCache>) -> Result<WsprMessage, UnpackError> {
    let (n1, m1) = bytes_to_fields(payload);
    let ngrid = m1 >> 7;
    let ntype = (m1 & 0x7f) as i32 - 64;

    ensure!(ntype <= 62, InvalidPowerCodeSnafu { code: ntype });

    if ntype >= 0 {
        let call = unpack_call(n1)?;
        let nu = ntype % 10;

        let message = if matches!(nu, 0 | 3 | 7) {
            let locator = unpack_grid(ngrid)?;
            WsprMessage {
                call_loc_pow: format!("{} {} {}", call, locator, ntype),
                callsign: call.clone(),
                call,
                locator,
                power: ntype,
                kind: MessageKind::Standard,
            }
        } else {
            let nadd = match nu {
                1 | 2 => nu,
                4..=6 => nu - 3,
                _ => nu - 7,
            };
            let nprefix = ngrid + 32_768 * (nadd as u32 - 1);
            let callsign = apply_prefix(nprefix, &call)?;
            let power = ntype - nadd;
            WsprMessage {
                call_loc_pow: format!("{} {}", callsign, power),
                call,
                locator: String::new(),
                power,
                callsign,
                kind: MessageKind::Compound,
            }
        };

        if let Some(hashes) = hashes {
            hashes.insert(&message.callsign);
        }
        return Ok(message);
    }

    let chars = unpack_call_chars(n1)?;
    let locator: String = std::iter::once(chars[5]).chain(chars[..5].iter().copied()).collect();
    ensure!(!locator.contains(' '), InvalidLocatorFieldSnafu { packed: n1 });

    let hash = (ngrid & 0x7fff) as u16;
    let callsign = match hashes.and_then(|h| h.lookup(hash)) {
        Some(call) => format!("<{}>", call),
        None => "<...>".to_string(),
    };
    let power = -(ntype + 1);

    Ok(WsprMessage {
        call_loc_pow: format!("{} {} {}", callsign, locator, power),
        call: String::new(),
        locator,
        power,
        callsign,
        kind: MessageKind::Hashed,
    })
}
