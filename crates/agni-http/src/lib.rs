//! REST control plane: apikey-authenticated HTTP monitor wrapping a
//! [`HttpController`] the host kernel implements.

pub mod auth;
pub mod controller;
pub mod error;
pub mod routes;
pub mod server;

pub use controller::HttpController;
pub use error::HttpError;
pub use server::{AppState, HttpMonitor};
