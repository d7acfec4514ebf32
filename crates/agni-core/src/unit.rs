use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::log::LogLevel;

/// `spec.md` §3: pool size is clamped to this value; a unit config
/// requesting more instances silently gets fewer.
pub const MAX_POOL_SIZE: usize = 5;

/// The three WS hub broadcast classes a client can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorClass {
    Activity,
    Status,
    Log,
}

impl MonitorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorClass::Activity => "activity",
            MonitorClass::Status => "status",
            MonitorClass::Log => "log",
        }
    }
}

/// The narrow capability set the host hands down to every unit instance at
/// `Initialize` time. This is the one-way interface described in §9's design
/// note on cyclic references: units never own the host, they only hold this
/// trait object, so the host remains free to be dropped/rebuilt across a
/// reload without units keeping it alive.
pub trait HostCapabilities: Send + Sync {
    /// Routes a log line to the host's logger pipeline (and, transitively,
    /// the WS log tee) at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// `Add_Request_HandleCount`
    fn add_request_handled(&self);

    /// `Add_Request_Failed_Count`
    fn add_request_failed(&self);

    /// True once the host's cancellation context has fired — units should
    /// treat this as an early hint to wind down in-flight work ahead of
    /// `Stop` being called.
    fn is_cancelled(&self) -> bool;
}

/// The contract a loaded application-unit plug-in must implement. Matches
/// `spec.md` §3 and §4.1's `Load_Units` description: `Initialize` then
/// `Start` must both succeed for the instance to join the live sequence;
/// `Stop` is the only way it leaves.
#[async_trait]
pub trait ApplicationUnit: Send + Sync {
    async fn initialize(
        &mut self,
        host: Arc<dyn HostCapabilities>,
        pool_index: usize,
        name: &str,
        plugin_path: &str,
        config_path: &str,
    ) -> Result<(), CoreError>;

    async fn start(&mut self) -> Result<(), CoreError>;

    async fn stop(&mut self) -> Result<(), CoreError>;

    fn is_started(&self) -> bool;

    /// Static-ish descriptive info surfaced through `AppInfo.AppUnits`.
    fn info(&self) -> Value;

    /// Dynamic status surfaced through `AppStatus.Units`.
    fn status(&self) -> Value;
}

/// One live instance in a unit's pool. Flattened across all pools, these
/// make up the host record's `Children` sequence (`spec.md` §3).
pub struct UnitHandle {
    pub name: String,
    pub pool_index: usize,
    pub plugin_path: String,
    pub config_path: String,
    pub enabled: bool,
    pub pool_size: usize,
    pub unit: Arc<Mutex<Box<dyn ApplicationUnit>>>,
}

impl UnitHandle {
    pub async fn is_started(&self) -> bool {
        self.unit.lock().await.is_started()
    }

    pub async fn info(&self) -> Value {
        self.unit.lock().await.info()
    }

    pub async fn status(&self) -> Value {
        self.unit.lock().await.status()
    }
}
