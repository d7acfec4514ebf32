use agni_core::ApplicationUnit;
use libloading::Library;
use parking_lot::Mutex;
use tracing::debug;

use crate::capability::{
    ApplicationUnitConstructor, HttpClientConstructor, HttpClientPlugin, PluginCapability,
    WsClientConstructor, WsClientPlugin,
};
use crate::error::PluginError;

/// Opens shared-object plug-ins by absolute path, resolves an exported
/// constructor symbol, and hands back a freshly built capability instance.
///
/// Loaded [`Library`] handles are retained for the loader's lifetime
/// (grounded on the `PLUGIN_LIBRARIES_PTR` pattern in the
/// `rusty_plugin_workflow` reference engine, which keeps a
/// `Vec<libloading::Library>` alive so dynamic libraries are never
/// unloaded out from under instances still using them) rather than dropped
/// as soon as the constructor returns.
#[derive(Default)]
pub struct PluginLoader {
    libraries: Mutex<Vec<Library>>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `symbol` in the shared object at `path` and constructs an
    /// `ApplicationUnit` instance via it.
    pub fn load_application_unit(
        &self,
        path: &str,
        symbol: &str,
    ) -> Result<Box<dyn ApplicationUnit>, PluginError> {
        let instance = unsafe {
            let lib = self.open(path)?;
            let ctor: libloading::Symbol<ApplicationUnitConstructor> = lib
                .get(symbol.as_bytes())
                .map_err(|e| PluginError::symbol(path, symbol, PluginCapability::ApplicationUnit, e))?;
            let instance = ctor();
            self.retain(lib);
            instance
        };
        debug!(path, symbol, "loaded application-unit plug-in");
        Ok(instance)
    }

    pub fn load_http_client(
        &self,
        path: &str,
        symbol: &str,
    ) -> Result<Box<dyn HttpClientPlugin>, PluginError> {
        let instance = unsafe {
            let lib = self.open(path)?;
            let ctor: libloading::Symbol<HttpClientConstructor> = lib
                .get(symbol.as_bytes())
                .map_err(|e| PluginError::symbol(path, symbol, PluginCapability::HttpClient, e))?;
            let instance = ctor();
            self.retain(lib);
            instance
        };
        debug!(path, symbol, "loaded http-client plug-in");
        Ok(instance)
    }

    pub fn load_ws_client(
        &self,
        path: &str,
        symbol: &str,
    ) -> Result<Box<dyn WsClientPlugin>, PluginError> {
        let instance = unsafe {
            let lib = self.open(path)?;
            let ctor: libloading::Symbol<WsClientConstructor> = lib
                .get(symbol.as_bytes())
                .map_err(|e| PluginError::symbol(path, symbol, PluginCapability::WsClient, e))?;
            let instance = ctor();
            self.retain(lib);
            instance
        };
        debug!(path, symbol, "loaded ws-client plug-in");
        Ok(instance)
    }

    /// # Safety
    /// Loading arbitrary shared objects runs their initializer code; the
    /// caller is trusted to only point this at plug-ins built for this
    /// host.
    unsafe fn open(&self, path: &str) -> Result<Library, PluginError> {
        Library::new(path).map_err(|e| PluginError::Open {
            path: path.to_string(),
            source: e,
        })
    }

    fn retain(&self, lib: Library) {
        self.libraries.lock().push(lib);
    }

    pub fn loaded_count(&self) -> usize {
        self.libraries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reports_missing_file_as_plugin_error() {
        let loader = PluginLoader::new();
        let err = loader
            .load_application_unit("/nonexistent/path/to/plugin.so", "new_unit")
            .unwrap_err();
        assert!(matches!(err, PluginError::Open { .. }));
    }
}
