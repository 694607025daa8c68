//! Branch metric table for 8-bit soft symbols
//!
//! A soft symbol `s` in 0..=255 is modelled as Gaussian around 32 for a zero
//! bit and 160 for a one bit (the centres of the packed tone pairs
//! {0, 64} and {128, 192}), with sigma 48. The metric is the log2 likelihood
//! ratio against the mixture, minus the code rate, scaled by 10.

const MEAN_ZERO: f64 = 32.0;
const MEAN_ONE: f64 = 160.0;
const SIGMA: f64 = 48.0;
const RATE: f64 = 0.5;
const SCALE: f64 = 10.0;

lazy_static::lazy_static! {
    /// `METRICS[bit][symbol]`
    pub(crate) static ref METRICS: [[i32; 256]; 2] = build();
}

fn build() -> [[i32; 256]; 2] {
    let mut table = [[0i32; 256]; 2];
    for s in 0..256 {
        let x = s as f64;
        // ln P(s|1) - ln P(s|0)
        let llr = ((x - MEAN_ZERO).powi(2) - (x - MEAN_ONE).powi(2)) / (2.0 * SIGMA * SIGMA);
        for bit in 0..2 {
            let favour = if bit == 1 { llr } else { -llr };
            let m = (2.0 / (1.0 + (-favour).exp())).log2() - RATE;
            table[bit][s] = (SCALE * m).round() as i32;
        }
    }
    table
}
