//! Convolutional encoder for the WSPR K=32, rate 1/2 code

use bitvec::prelude::*;

use super::{NBITS, NSYM, POLY1, POLY2};

/// Both output bits for a shift-register state, first polynomial in bit 1
#[inline]
pub(crate) fn branch_symbols(state: u32) -> usize {
    ((((state & POLY1).count_ones() & 1) << 1) | ((state & POLY2).count_ones() & 1)) as usize
}

/// Encode the first 81 bits of `payload` (MSB first) into 162 code bits
///
/// The payload must already carry the 31 zero tail bits after the 50 message bits.
pub fn encode(payload: &[u8]) -> [u8; NSYM] {
    let bits = &payload.view_bits::<Msb0>()[..NBITS];
    let mut out = [0u8; NSYM];
    let mut state = 0u32;

    for (k, bit) in bits.iter().by_vals().enumerate() {
        state = (state << 1) | bit as u32;
        let sym = branch_symbols(state);
        out[2 * k] = (sym >> 1) as u8;
        out[2 * k + 1] = (sym & 1) as u8;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_payload_encodes_to_zeros() {
        assert!(encode(&[0u8; 11]).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_single_leading_one_emits_both_taps() {
        // Only the top message bit set: the first branch sees state 1,
        // and both polynomials have their lowest tap set.
        let mut payload = [0u8; 11];
        payload[0] = 0x80;
        let code = encode(&payload);
        assert_eq!(&code[..2], &[1, 1]);
    }
}
