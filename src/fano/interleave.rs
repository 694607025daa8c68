//! Bit-reversal interleaver over the 162 WSPR channel symbols

use super::NSYM;

lazy_static::lazy_static! {
    /// Channel position of the p-th code symbol
    static ref ORDER: [usize; NSYM] = {
        let mut order = [0usize; NSYM];
        let mut p = 0;
        for i in 0..=255u8 {
            let j = i.reverse_bits() as usize;
            if j < NSYM {
                order[p] = j;
                p += 1;
            }
        }
        order
    };
}

/// Code order to channel order
pub fn interleave(symbols: &mut [u8; NSYM]) {
    let mut tmp = [0u8; NSYM];
    for (p, &j) in ORDER.iter().enumerate() {
        tmp[j] = symbols[p];
    }
    *symbols = tmp;
}

/// Channel order back to code order
pub fn deinterleave(symbols: &mut [u8; NSYM]) {
    let mut tmp = [0u8; NSYM];
    for (p, &j) in ORDER.iter().enumerate() {
        tmp[p] = symbols[j];
    }
    *symbols = tmp;
}
