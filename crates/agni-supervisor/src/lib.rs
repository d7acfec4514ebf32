//! Host kernel: the lifecycle state machine tying together config
//! loading, the unit pool, the logger, and the HTTP/WS monitors into one
//! `Host` handle.

pub mod error;
pub mod host;
pub mod memory;

pub use error::SupervisorError;
pub use host::{Host, APPLICATION_UNIT_SYMBOL};
