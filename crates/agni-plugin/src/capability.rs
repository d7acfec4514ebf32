use async_trait::async_trait;

/// The three capabilities a loaded shared object can be asserted to
/// implement, per `spec.md` §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginCapability {
    ApplicationUnit,
    HttpClient,
    WsClient,
}

impl PluginCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginCapability::ApplicationUnit => "application-unit",
            PluginCapability::HttpClient => "http-client",
            PluginCapability::WsClient => "ws-client",
        }
    }
}

/// Inbound contract for an HTTP-client worker plug-in. The concrete
/// implementations are out of scope (`spec.md` §1); only this shape, used
/// by units that pick an entry from the core config's plug-in catalogue,
/// matters to the host.
#[async_trait]
pub trait HttpClientPlugin: Send + Sync {
    async fn request(&self, method: &str, url: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>, String>;
}

/// Inbound contract for a WS-client worker plug-in.
#[async_trait]
pub trait WsClientPlugin: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(), String>;
    async fn send(&self, message: &str) -> Result<(), String>;
}

/// Function-pointer shape every plug-in's exported symbol must have: a
/// zero-argument constructor returning a freshly boxed instance. Same-ABI
/// Rust dylibs (built with the same compiler as the host) can export a
/// plain `fn` pointer of this shape; there is no `extern "C"` boundary
/// because the capability traits themselves are not FFI-safe.
pub type Constructor<T> = unsafe fn() -> Box<T>;

pub type ApplicationUnitConstructor = Constructor<dyn agni_core::ApplicationUnit>;
pub type HttpClientConstructor = Constructor<dyn HttpClientPlugin>;
pub type WsClientConstructor = Constructor<dyn WsClientPlugin>;
