//! WS hub (three broadcast classes, per-class cap, slow-client eviction)
//! and the HTTP upgrade endpoints wrapping it.

pub mod client;
pub mod error;
pub mod hub;
pub mod monitor;

pub use error::WsError;
pub use hub::{Hub, HubHandle, MAX_CLIENTS_PER_CLASS};
pub use monitor::WsMonitor;
