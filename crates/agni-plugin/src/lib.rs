//! Dynamic plug-in loader: resolves a named symbol of a requested
//! capability from a shared object and constructs a fresh instance.

pub mod capability;
pub mod error;
pub mod loader;

pub use capability::{
    ApplicationUnitConstructor, HttpClientConstructor, HttpClientPlugin, PluginCapability,
    WsClientConstructor, WsClientPlugin,
};
pub use error::PluginError;
pub use loader::PluginLoader;
