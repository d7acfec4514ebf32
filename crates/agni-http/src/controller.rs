use agni_core::LogLevel;
use async_trait::async_trait;
use serde_json::Value;

/// The narrow capability set the HTTP monitor needs from the host kernel.
/// `agni-supervisor` implements this so `agni-http` never depends back on
/// it — the inverse of the same one-way capability pattern units receive
/// from `agni-core::HostCapabilities`.
#[async_trait]
pub trait HttpController: Send + Sync {
    /// Latest cached `AppInfo` snapshot, serialized.
    fn info(&self) -> Value;

    /// Latest cached `AppStatus` snapshot, serialized.
    fn status(&self) -> Value;

    async fn start_ws_monitor(&self) -> Result<(), String>;

    async fn stop_ws_monitor(&self) -> Result<(), String>;

    async fn reload_config(&self) -> Result<(), String>;

    /// `body` is always non-empty by the time this is called; the 204
    /// empty-body short circuit happens in the route handler.
    async fn save_app_config(&self, body: &[u8]) -> Result<(), String>;

    fn set_log_level(&self, level: LogLevel);

    /// The configured unit list, serialized.
    fn list_units(&self) -> Value;

    /// `AppUnitInfo` for one unit by name, if it exists.
    fn unit_status(&self, name: &str) -> Option<Value>;
}
