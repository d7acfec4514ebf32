use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cached, mutex-guarded snapshot served by `GET /info`. Refreshed on a
/// 5-second cadence by `update_info_process`; readers always see a fully
/// populated copy because the writer holds the snapshot mutex for the
/// whole refresh (`spec.md` §5 ordering guarantee).
///
/// Field set supplemented from `original_source/src/core/app_status.go`'s
/// `AppInfo` (see `SPEC_FULL.md`), since `spec.md` names the snapshot but
/// not its exact shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AppInfo {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub pid: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub main_path: String,
    pub app_config_path: String,
    pub log_path: String,
    pub log_file: String,
    pub app_units: Vec<AppUnitInfo>,
}

/// Cached, mutex-guarded snapshot served by `GET /status` and broadcast
/// once a second to connected STATUS-class WS clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AppStatus {
    pub uptime_seconds: u64,
    pub mem_alloc_bytes: u64,
    pub mem_total_bytes: u64,
    /// Absolute difference from the previous sample; never negative
    /// (`spec.md` §4.1 / §8 testable property 8).
    pub mem_delta_bytes: u64,
    pub no_of_routines: u16,
    pub requests_handled: u64,
    pub requests_failed: u64,
    pub units: Vec<AppUnitInfo>,
}

/// Per-unit projection embedded in both snapshots; also the payload of
/// `GET /admin/unit/{name}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AppUnitInfo {
    pub name: String,
    pub pool: usize,
    pub enabled: bool,
    pub started: bool,
    pub info: Value,
    pub status: Value,
}
