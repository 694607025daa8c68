//! WSPR Symbol Mapping
//!
//! Each of the 162 channel symbols is one of four tones:
//! `tone = sync_bit + 2 * data_bit`, where the data bits are the interleaved
//! convolutional code bits and the sync bits follow a fixed pseudo-random vector.
//!
//! On receive, the tone index recovered from the spectrum (a "token") is only
//! known up to an ordering of the four tones, so decoding tries each of the 24
//! orderings. A remapped tone is packed as an 8-bit soft symbol by shifting it
//! into the top two bits (0, 64, 128, 192).

use crate::fano::{self, NSYM};

/// Total number of symbols in a WSPR transmission
pub const NN: usize = NSYM;

/// Number of tone orderings searched on receive
pub const PERMUTATIONS: usize = 24;

/// Bit position of a tone inside a packed soft symbol
pub const SYMBOL_SHIFT: u32 = 6;

/// Sync vector carried in the low bit of every tone
pub const SYNC_VECTOR: [u8; NN] = [
    1, 1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1, 0,
    0, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 1,
    0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 0, 1,
    1, 0, 1, 0, 0, 0, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1,
    0, 0, 1, 0, 1, 1, 0, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0,
    0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 1, 1, 0, 0, 1, 1,
    0, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 1, 1,
    0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0, 0, 1, 1, 0,
    0, 0,
];

/// Token to tone tables: every ordering of {0, 1, 2, 3}, lexicographic
pub const TOKEN_TO_SYMBOL: [[u8; 4]; PERMUTATIONS] = [
    [0, 1, 2, 3], [0, 1, 3, 2], [0, 2, 1, 3], [0, 2, 3, 1],
    [0, 3, 1, 2], [0, 3, 2, 1], [1, 0, 2, 3], [1, 0, 3, 2],
    [1, 2, 0, 3], [1, 2, 3, 0], [1, 3, 0, 2], [1, 3, 2, 0],
    [2, 0, 1, 3], [2, 0, 3, 1], [2, 1, 0, 3], [2, 1, 3, 0],
    [2, 3, 0, 1], [2, 3, 1, 0], [3, 0, 1, 2], [3, 0, 2, 1],
    [3, 1, 0, 2], [3, 1, 2, 0], [3, 2, 0, 1], [3, 2, 1, 0],
];

/// Remap tokens through table `selector` into packed soft symbols
///
/// # Panics
/// If `selector >= 24`, a token exceeds 3, or `tokens` is shorter than 162.
pub fn remap(tokens: &[u8], selector: usize) -> [u8; NN] {
    let table = &TOKEN_TO_SYMBOL[selector];
    let mut symbols = [0u8; NN];
    for (symbol, &token) in symbols.iter_mut().zip(&tokens[..NN]) {
        *symbol = table[token as usize] << SYMBOL_SHIFT;
    }
    symbols
}

/// Recover tokens from packed soft symbols produced by table `selector`
pub fn inverse_remap(symbols: &[u8; NN], selector: usize) -> [u8; NN] {
    let table = &TOKEN_TO_SYMBOL[selector];
    let mut inverse = [0u8; 4];
    for (token, &tone) in table.iter().enumerate() {
        inverse[tone as usize] = token as u8;
    }

    let mut tokens = [0u8; NN];
    for (token, &symbol) in tokens.iter_mut().zip(symbols.iter()) {
        *token = inverse[(symbol >> SYMBOL_SHIFT) as usize];
    }
    tokens
}

/// Channel tones (0-3) for a packed 81-bit payload
pub fn channel_symbols(payload: &[u8]) -> [u8; NN] {
    let mut code = fano::encode(payload);
    fano::interleave(&mut code);

    let mut tones = [0u8; NN];
    for ((tone, &sync), &bit) in tones.iter_mut().zip(SYNC_VECTOR.iter()).zip(code.iter()) {
        *tone = sync + 2 * bit;
    }
    tones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::pack_type1;

    #[test]
    fn test_tables_are_distinct_permutations() {
        for (i, table) in TOKEN_TO_SYMBOL.iter().enumerate() {
            let mut sorted = *table;
            sorted.sort_unstable();
            assert_eq!(sorted, [0, 1, 2, 3], "table {} is not a permutation", i);
            for other in &TOKEN_TO_SYMBOL[..i] {
                assert_ne!(table, other);
            }
        }
    }

    #[test]
    fn test_inverse_remap_restores_tokens() {
        let tokens: Vec<u8> = (0..NN).map(|i| ((i * 7 + i / 3) % 4) as u8).collect();
        for selector in 0..PERMUTATIONS {
            let symbols = remap(&tokens, selector);
            assert!(symbols.iter().all(|s| s % 64 == 0));
            assert_eq!(inverse_remap(&symbols, selector).to_vec(), tokens);
        }
    }

    #[test]
    fn test_identity_table_packs_tones() {
        let tokens = [0u8, 1, 2, 3].repeat(NN / 4 + 1);
        let symbols = remap(&tokens, 0);
        assert_eq!(&symbols[..4], &[0, 64, 128, 192]);
    }

    #[test]
    fn test_channel_symbols_carry_sync() {
        let payload = pack_type1("K1ABC", "FN42", 37).unwrap();
        let tones = channel_symbols(&payload);
        for (tone, sync) in tones.iter().zip(SYNC_VECTOR.iter()) {
            assert!(*tone < 4);
            assert_eq!(tone & 1, *sync);
        }
    }

    #[test]
    fn test_sync_vector_is_binary() {
        assert!(SYNC_VECTOR.iter().all(|&b| b <= 1));
        assert_eq!(&SYNC_VECTOR[..8], &[1, 1, 0, 0, 0, 0, 0, 0]);
    }
}
