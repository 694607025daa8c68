use snafu::Snafu;

/// Errors surfaced by the window pipeline and its I/O collaborators
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// Reading the sample stream or writing a capture failed
    #[snafu(display("I/O error: {source}"))]
    Io { source: std::io::Error },

    /// WAV input could not be opened or decoded
    #[snafu(display("WAV input error: {source}"))]
    Wav { source: hound::Error },

    /// Configuration values are inconsistent
    #[snafu(display("invalid configuration: {reason}"))]
    InvalidConfig { reason: String },

    /// A decode pass is already in flight
    #[snafu(display("decode slot is busy"))]
    SlotBusy,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
