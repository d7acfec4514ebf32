use thiserror::Error;

use crate::capability::PluginCapability;

/// `spec.md` §7: plug-in load errors are logged and the affected slot is
/// skipped; they never crash the host.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to open plug-in {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol {symbol} not found in {path} for capability {capability}: {source}")]
    Symbol {
        path: String,
        symbol: String,
        capability: &'static str,
        #[source]
        source: libloading::Error,
    },
}

impl PluginError {
    pub fn symbol(path: &str, symbol: &str, capability: PluginCapability, source: libloading::Error) -> Self {
        Self::Symbol {
            path: path.to_string(),
            symbol: symbol.to_string(),
            capability: capability.as_str(),
            source,
        }
    }
}
