pub mod candidate;
pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod fano;
pub mod fft;
pub mod message;
pub mod simulation;
pub mod source;
pub mod spot;
pub mod symbol;
pub mod tracing_init;
pub mod window;

pub use config::WindowConfig;
pub use error::{Error, Result};
pub use spot::{LogSink, MemorySink, Spot, SpotSink};
pub use window::{WorkSlot, Workspace, WsprWindow};
