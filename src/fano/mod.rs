//! Sequential (Fano) decoding of the WSPR convolutional code
//!
//! **Code**: constraint length 32, rate 1/2, polynomials `0xF2D05351` and
//! `0xE4613C47`. 50 message bits plus 31 zero tail bits give 81 branches and
//! 162 code symbols, spread over the transmission by a bit-reversal interleaver.
//!
//! **Decoder**: the Fano algorithm walks the code tree keeping only the current
//! path. It moves forward while the path metric stays above a running
//! threshold, tightens the threshold in steps of `delta` on first visits and
//! backs up (loosening it) when every branch falls below. The search is bounded
//! by a cap on node expansions.
//!
//! **Scratch**: the node array is allocated once, owned by whichever decode
//! pass currently holds the decoder, and reused across attempts.

mod encode;
mod interleave;
mod metric;

pub use encode::encode;
pub use interleave::{deinterleave, interleave};

use encode::branch_symbols;
use metric::METRICS;

use crate::message::{self, UnpackError, WsprMessage};

pub const POLY1: u32 = 0xf2d0_5351;
pub const POLY2: u32 = 0xe461_3c47;

/// Branches in the code tree, tail included
pub const NBITS: usize = 81;

/// Code symbols per transmission
pub const NSYM: usize = 2 * NBITS;

/// Zero bits flushing the encoder
pub const TAIL_BITS: usize = 31;

/// Bytes returned by the decoder (only the first 11 can be non-zero)
pub const PAYLOAD_BYTES: usize = 12;

/// Diagnostics common to accepted and rejected attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoStats {
    /// Path metric of the deepest node the search ended on
    pub metric: i64,
    /// Node expansions used
    pub cycles: u32,
    /// Deepest node reached
    pub max_depth: usize,
}

/// A path through the whole code tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoOutcome {
    pub stats: FanoStats,
    pub payload: [u8; PAYLOAD_BYTES],
}

/// Seams used by the permutation search
pub trait SequentialDecoder {
    fn deinterleave(&self, symbols: &mut [u8; NSYM]) {
        deinterleave(symbols)
    }

    fn decode(
        &mut self,
        symbols: &[u8; NSYM],
        nbits: usize,
        delta: i32,
        max_cycles: u32,
    ) -> Result<FanoOutcome, FanoStats>;

    fn unpack(&mut self, payload: &[u8; PAYLOAD_BYTES]) -> Result<WsprMessage, UnpackError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Node {
    /// Encoder shift register including this node's input bit
    state: u32,
    /// Cumulative path metric on arrival
    gamma: i64,
    /// Branch metrics for the four possible symbol pairs
    metrics: [i32; 4],
    /// Branch metrics, best first
    tm: [i32; 2],
    /// Which of `tm` is being tried
    i: usize,
}

/// Node array shared by successive decode attempts
#[derive(Debug, Clone)]
pub struct FanoScratch {
    nodes: Vec<Node>,
}

impl FanoScratch {
    pub fn new(nbits: usize) -> Self {
        Self { nodes: vec![Node::default(); nbits + 1] }
    }
}

/// Fano decoder plus the callsign hash cache used when unpacking
pub struct FanoDecoder {
    scratch: FanoScratch,
    hashes: message::CallsignHashCache,
}

impl FanoDecoder {
    pub fn new() -> Self {
        Self {
            scratch: FanoScratch::new(NBITS),
            hashes: message::CallsignHashCache::new(),
        }
    }

    pub fn hashes(&self) -> &message::CallsignHashCache {
        &self.hashes
    }
}

impl Default for FanoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialDecoder for FanoDecoder {
    fn decode(
        &mut self,
        symbols: &[u8; NSYM],
        nbits: usize,
        delta: i32,
        max_cycles: u32,
    ) -> Result<FanoOutcome, FanoStats> {
        fano(&mut self.scratch, symbols, nbits, delta, max_cycles)
    }

    fn unpack(&mut self, payload: &[u8; PAYLOAD_BYTES]) -> Result<WsprMessage, UnpackError> {
        message::unpack(payload, Some(&mut self.hashes))
    }
}

/// Run the Fano algorithm over deinterleaved soft symbols
pub fn fano(
    scratch: &mut FanoScratch,
    symbols: &[u8; NSYM],
    nbits: usize,
    delta: i32,
    max_cycles: u32,
) -> Result<FanoOutcome, FanoStats> {
    let nbits = nbits.min(NBITS);
    if scratch.nodes.len() < nbits + 1 {
        scratch.nodes.resize(nbits + 1, Node::default());
    }
    let nodes = &mut scratch.nodes[..=nbits];
    let tail = nbits.saturating_sub(TAIL_BITS);
    let delta = delta as i64;

    for (k, node) in nodes[..nbits].iter_mut().enumerate() {
        let s0 = symbols[2 * k] as usize;
        let s1 = symbols[2 * k + 1] as usize;
        node.metrics = [
            METRICS[0][s0] + METRICS[0][s1],
            METRICS[0][s0] + METRICS[1][s1],
            METRICS[1][s0] + METRICS[0][s1],
            METRICS[1][s0] + METRICS[1][s1],
        ];
    }

    let mut np = 0usize;
    let lsym = branch_symbols(0);
    nodes[0].state = 0;
    nodes[0].tm = [nodes[0].metrics[lsym], nodes[0].metrics[3 ^ lsym]];
    nodes[0].i = 0;
    nodes[0].gamma = 0;

    let mut t: i64 = 0;
    let mut max_depth = 0usize;
    let mut cycles = 0u32;
    let mut complete = false;

    while cycles < max_cycles {
        cycles += 1;
        let ngamma = nodes[np].gamma + nodes[np].tm[nodes[np].i] as i64;

        if ngamma >= t {
            // First visit: tighten the threshold as far as it goes
            if nodes[np].gamma < t + delta {
                while ngamma >= t + delta {
                    t += delta;
                }
            }
            nodes[np + 1].gamma = ngamma;
            nodes[np + 1].state = nodes[np].state << 1;
            np += 1;
            max_depth = max_depth.max(np);
            if np == nbits {
                complete = true;
                break;
            }

            let node = &mut nodes[np];
            let lsym = branch_symbols(node.state);
            if np >= tail {
                node.tm[0] = node.metrics[lsym];
            } else {
                let m0 = node.metrics[lsym];
                let m1 = node.metrics[3 ^ lsym];
                if m0 > m1 {
                    node.tm = [m0, m1];
                } else {
                    node.tm = [m1, m0];
                    node.state += 1;
                }
            }
            node.i = 0;
            continue;
        }

        // Look back
        loop {
            if np == 0 || nodes[np - 1].gamma < t {
                t -= delta;
                if nodes[np].i != 0 {
                    nodes[np].i = 0;
                    nodes[np].state ^= 1;
                }
                break;
            }
            np -= 1;
            if np < tail && nodes[np].i != 1 {
                nodes[np].i += 1;
                nodes[np].state ^= 1;
                break;
            }
        }
    }

    let stats = FanoStats { metric: nodes[np].gamma, cycles, max_depth };
    if !complete {
        return Err(stats);
    }

    let mut payload = [0u8; PAYLOAD_BYTES];
    for (byte, k) in payload.iter_mut().zip((7..nbits).step_by(8)) {
        *byte = nodes[k].state as u8;
    }
    Ok(FanoOutcome { stats, payload })
}
