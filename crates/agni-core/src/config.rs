use serde::{Deserialize, Serialize};

use crate::unit::MAX_POOL_SIZE;

/// `core.config` — host identity, the REST/WS monitor bind addresses, and
/// the plug-in catalogue units are allowed to pick their HTTP/WS client
/// plug-ins from. Treated as read-only after `Initialize`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct CoreConfig {
    pub app_name: String,
    pub app_id: String,
    #[serde(default = "default_rest_host")]
    pub rest_host: String,
    #[serde(default = "default_rest_port")]
    pub rest_port: u16,
    #[serde(default = "default_ws_host")]
    pub ws_host: String,
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,
    /// Overrides the `--log_path` default when the flag isn't given.
    #[serde(default)]
    pub log_path: Option<String>,
    #[serde(default)]
    pub plugins: PluginCatalogue,
}

fn default_rest_host() -> String {
    "0.0.0.0".to_string()
}
fn default_rest_port() -> u16 {
    8080
}
fn default_ws_host() -> String {
    "0.0.0.0".to_string()
}
fn default_ws_port() -> u16 {
    2345
}

/// Ordered candidate lists for the two externally-supplied plug-in flavors
/// units may load: http-client and ws-client. The application-unit plug-ins
/// themselves are listed per-unit in `AppConfig`, not here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct PluginCatalogue {
    #[serde(default)]
    pub http_clients: Vec<PluginCatalogueEntry>,
    #[serde(default)]
    pub ws_clients: Vec<PluginCatalogueEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    ApplicationUnit,
    HttpClient,
    WsClient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct PluginCatalogueEntry {
    pub type_tag: String,
    pub symbol: String,
    pub path: String,
    #[serde(default)]
    pub enable: bool,
}

/// `<app_path>/app.config` — the unit list. Replaced wholesale by
/// `Reload_Config`/`Save_App_Config`; never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct AppConfig {
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct UnitConfig {
    pub name: String,
    /// `0` disables the unit entirely (logged and skipped at load time).
    #[serde(default)]
    pub enable: u8,
    /// Clamped to `MAX_POOL_SIZE` at load time; `0` means "skip with a
    /// warning", matching `spec.md` §4.1's `Load_Units` algorithm.
    #[serde(default)]
    pub pool_size: u32,
    pub plugin_path: String,
    pub config_path: String,
}

impl UnitConfig {
    pub fn is_enabled(&self) -> bool {
        self.enable != 0
    }

    /// Applies the `MAX_POOL_SIZE` clamp described in `spec.md` §4.1.
    pub fn clamped_pool_size(&self) -> u32 {
        self.pool_size.min(MAX_POOL_SIZE as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_config_parses_pascal_case_json() {
        let json = r#"{
            "AppName": "agnihost",
            "AppId": "agni-demo",
            "RestPort": 18080,
            "WsPort": 12345,
            "Plugins": {
                "HttpClients": [{"TypeTag": "http", "Symbol": "NewHttpClient", "Path": "./plugins/http.so", "Enable": true}],
                "WsClients": []
            }
        }"#;
        let cfg: CoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rest_port, 18080);
        assert_eq!(cfg.ws_port, 12345);
        assert_eq!(cfg.plugins.http_clients.len(), 1);
        assert_eq!(cfg.rest_host, "0.0.0.0");
    }

    #[test]
    fn unit_config_clamps_pool_size_to_max() {
        let unit = UnitConfig {
            name: "worker".into(),
            enable: 1,
            pool_size: 9,
            plugin_path: "./worker.so".into(),
            config_path: "./worker.json".into(),
        };
        assert_eq!(unit.clamped_pool_size(), MAX_POOL_SIZE as u32);
    }

    #[test]
    fn app_config_round_trips_through_json() {
        let app = AppConfig {
            units: vec![UnitConfig {
                name: "worker".into(),
                enable: 1,
                pool_size: 2,
                plugin_path: "./worker.so".into(),
                config_path: "./worker.json".into(),
            }],
        };
        let text = serde_json::to_string(&app).unwrap();
        let back: AppConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(app, back);
    }
}
