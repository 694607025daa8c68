//! Window offset / tone ordering search for one candidate
//!
//! Tokens are known only up to an ordering of the four tones, and the frame
//! start only up to a few symbols, so every (offset, ordering) pair is tried in
//! turn. The first attempt the decoder accepts with a non-zero payload that
//! also unpacks ends the search.

use tracing::debug;

use crate::fano::{FanoStats, SequentialDecoder, NBITS};
use crate::message::WsprMessage;
use crate::symbol::{remap, PERMUTATIONS};

use super::NOMINAL_NUMBER_OF_SYMBOLS;

/// (window offset, permutation) pairs, offsets outermost
#[derive(Debug, Clone)]
pub struct SearchOrder {
    offsets: usize,
    offset: usize,
    permutation: usize,
}

impl SearchOrder {
    pub fn new(offsets: usize) -> Self {
        Self { offsets, offset: 0, permutation: 0 }
    }
}

impl Iterator for SearchOrder {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.offsets {
            return None;
        }
        let item = (self.offset, self.permutation);
        self.permutation += 1;
        if self.permutation == PERMUTATIONS {
            self.permutation = 0;
            self.offset += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.offset >= self.offsets {
            0
        } else {
            (self.offsets - self.offset) * PERMUTATIONS - self.permutation
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for SearchOrder {}

/// An accepted decode
#[derive(Debug, Clone, PartialEq)]
pub struct Decode {
    pub message: WsprMessage,
    pub window_offset: usize,
    pub permutation: usize,
    pub stats: FanoStats,
    /// Attempts made, this one included
    pub attempts: usize,
}

/// Search `tokens` for a frame the decoder accepts
pub fn search_candidate(
    tokens: &[u8],
    decoder: &mut dyn SequentialDecoder,
    delta: i32,
    max_cycles: u32,
) -> Option<Decode> {
    let offsets = (tokens.len() + 1).saturating_sub(NOMINAL_NUMBER_OF_SYMBOLS);

    for (attempts, (offset, permutation)) in SearchOrder::new(offsets).enumerate() {
        let mut symbols = remap(&tokens[offset..], permutation);
        decoder.deinterleave(&mut symbols);

        let outcome = match decoder.decode(&symbols, NBITS, delta, max_cycles) {
            Ok(outcome) => outcome,
            Err(stats) => {
                debug!(
                    offset,
                    permutation,
                    metric = stats.metric,
                    cycles = stats.cycles,
                    max_depth = stats.max_depth,
                    "decode rejected"
                );
                continue;
            }
        };

        if outcome.payload.iter().all(|&b| b == 0) {
            debug!(offset, permutation, "all-zero payload, false accept");
            continue;
        }

        match decoder.unpack(&outcome.payload) {
            Ok(message) => {
                return Some(Decode {
                    message,
                    window_offset: offset,
                    permutation,
                    stats: outcome.stats,
                    attempts: attempts + 1,
                })
            }
            Err(e) => debug!(offset, permutation, error = %e, "payload does not unpack, false accept"),
        }
    }
    None
}
