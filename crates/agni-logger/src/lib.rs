//! Rotating, level-filtered log sink consuming [`agni_core::LogMessage`]
//! values off a buffered channel onto a single gzip-rolled file.

pub mod error;
pub mod rotation;
pub mod sink;

pub use error::LoggerError;
pub use rotation::RotatingFile;
pub use sink::{Logger, CHANNEL_CAPACITY};
