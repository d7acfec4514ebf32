//! Core data model for the application framework host: the host/unit record
//! shapes, configuration documents, counters, and the capability traits that
//! units and plug-ins implement against. Nothing in this crate talks to a
//! socket or a filesystem directly — that belongs to `agni-files`,
//! `agni-plugin`, `agni-ws`, and `agni-http`.

pub mod config;
pub mod counters;
pub mod error;
pub mod log;
pub mod phase;
pub mod routines;
pub mod snapshot;
pub mod unit;

pub use config::{AppConfig, CoreConfig, PluginCatalogueEntry, PluginKind, UnitConfig};
pub use counters::Counters;
pub use error::CoreError;
pub use log::{LogLevel, LogMessage};
pub use phase::HostPhase;
pub use routines::RoutineTracker;
pub use snapshot::{AppInfo, AppStatus, AppUnitInfo};
pub use unit::{ApplicationUnit, MonitorClass, UnitHandle, MAX_POOL_SIZE};
