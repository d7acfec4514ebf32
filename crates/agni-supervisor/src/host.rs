use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agni_core::{
    AppConfig, AppInfo, AppStatus, AppUnitInfo, CoreConfig, Counters, HostCapabilities, HostPhase,
    LogLevel, LogMessage, MonitorClass, RoutineTracker, UnitHandle,
};
use agni_http::HttpController;
use agni_plugin::PluginLoader;
use agni_ws::{HubHandle, WsMonitor};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::SupervisorError;
use crate::memory::current_rss_bytes;

/// Fixed symbol name every application-unit plug-in must export, mirroring
/// `Get_AppUnit`'s `load_plugin("IAppUnit", ...)` call in the source —
/// unlike http/ws client plug-ins, application units are not drawn from a
/// named catalogue, so there is exactly one interface name to look up.
pub const APPLICATION_UNIT_SYMBOL: &str = "IAppUnit";

const STOP_UNITS_INTERLEAVE: Duration = Duration::from_millis(200);
const SNAPSHOT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
const STATUS_BROADCAST_INTERVAL: Duration = Duration::from_secs(1);

struct HostInner {
    app_version: String,
    pid: u32,

    phase: Mutex<HostPhase>,
    started_at: Mutex<Option<chrono::DateTime<Utc>>>,

    main_path: Mutex<PathBuf>,
    app_config_dir: Mutex<PathBuf>,
    log_path: Mutex<PathBuf>,
    log_file: Mutex<PathBuf>,
    rest_port: Mutex<u16>,
    ws_port: Mutex<u16>,

    core_config: Mutex<Option<CoreConfig>>,
    app_config: Mutex<Option<AppConfig>>,
    api_keys: Mutex<HashSet<String>>,

    plugin_loader: PluginLoader,
    units: AsyncMutex<Vec<UnitHandle>>,

    logger: RwLock<Option<agni_logger::Logger>>,
    http_monitor: AsyncMutex<Option<agni_http::HttpMonitor>>,
    ws_monitor: AsyncMutex<Option<WsMonitor>>,
    ws_hub: Mutex<Option<HubHandle>>,

    counters: Counters,
    routines: RoutineTracker,
    cancellation: Mutex<CancellationToken>,
    reload_requested: AtomicBool,

    info_snapshot: Mutex<AppInfo>,
    status_snapshot: Mutex<AppStatus>,
    prev_mem_bytes: AtomicU64,

    refreshers_stop: Mutex<Option<CancellationToken>>,
    broadcaster_stop: Mutex<Option<CancellationToken>>,
}

/// The host kernel. Cheaply cloneable (an `Arc` around the actual state) —
/// units, the HTTP monitor, and background tasks all hold a clone so they
/// can reach the same capability surface without the host owning them
/// back, per `spec.md` §3's ownership note.
#[derive(Clone)]
pub struct Host(Arc<HostInner>);

impl Host {
    pub fn new(app_version: impl Into<String>, pid: u32) -> Self {
        Self(Arc::new(HostInner {
            app_version: app_version.into(),
            pid,
            phase: Mutex::new(HostPhase::New),
            started_at: Mutex::new(None),
            main_path: Mutex::new(PathBuf::new()),
            app_config_dir: Mutex::new(PathBuf::new()),
            log_path: Mutex::new(PathBuf::new()),
            log_file: Mutex::new(PathBuf::new()),
            rest_port: Mutex::new(0),
            ws_port: Mutex::new(0),
            core_config: Mutex::new(None),
            app_config: Mutex::new(None),
            api_keys: Mutex::new(HashSet::new()),
            plugin_loader: PluginLoader::default(),
            units: AsyncMutex::new(Vec::new()),
            logger: RwLock::new(None),
            http_monitor: AsyncMutex::new(None),
            ws_monitor: AsyncMutex::new(None),
            ws_hub: Mutex::new(None),
            counters: Counters::new(),
            routines: RoutineTracker::new(),
            cancellation: Mutex::new(CancellationToken::new()),
            reload_requested: AtomicBool::new(false),
            info_snapshot: Mutex::new(AppInfo::default()),
            status_snapshot: Mutex::new(AppStatus::default()),
            prev_mem_bytes: AtomicU64::new(0),
            refreshers_stop: Mutex::new(None),
            broadcaster_stop: Mutex::new(None),
        }))
    }

    pub fn phase(&self) -> HostPhase {
        *self.0.phase.lock()
    }

    fn set_phase(&self, phase: HostPhase) {
        *self.0.phase.lock() = phase;
    }

    fn require_phase(
        &self,
        expected: HostPhase,
        operation: &'static str,
    ) -> Result<(), SupervisorError> {
        let current = self.phase();
        if current == expected {
            Ok(())
        } else {
            Err(SupervisorError::WrongPhase {
                phase: current.as_str(),
                operation,
            })
        }
    }

    pub fn app_name(&self) -> String {
        self.0
            .core_config
            .lock()
            .as_ref()
            .map(|c| c.app_name.clone())
            .unwrap_or_default()
    }

    fn app_id(&self) -> String {
        self.0
            .core_config
            .lock()
            .as_ref()
            .map(|c| c.app_id.clone())
            .unwrap_or_default()
    }

    /// `Initialize(ctx, pid, mainPath, appCfgPath, logPath, restPort, wsPort)`
    pub async fn initialize(
        &self,
        main_path: &Path,
        app_config_dir: &Path,
        log_path: &Path,
        rest_port_override: Option<u16>,
        ws_port_override: Option<u16>,
    ) -> Result<(), SupervisorError> {
        self.require_phase(HostPhase::New, "Initialize")?;

        let core_config = agni_files::read_core_config(&agni_files::paths::core_config_path(main_path))
            .await
            .map_err(SupervisorError::CoreConfig)?;
        let app_config = agni_files::read_app_config(&agni_files::paths::app_config_path(app_config_dir))
            .await
            .map_err(SupervisorError::AppConfig)?;
        let api_keys = agni_files::read_api_keys(&agni_files::paths::apikeys_path(main_path))
            .await
            .map_err(SupervisorError::ApiKeys)?;

        let log_file = agni_files::paths::log_file_path(log_path, &core_config.app_id);
        let mut logger = agni_logger::Logger::new(log_file.clone(), LogLevel::Info, self.0.pid);
        logger.start()?;

        let rest_port = rest_port_override.unwrap_or(core_config.rest_port);
        let ws_port = ws_port_override.unwrap_or(core_config.ws_port);

        *self.0.main_path.lock() = main_path.to_path_buf();
        *self.0.app_config_dir.lock() = app_config_dir.to_path_buf();
        *self.0.log_path.lock() = log_path.to_path_buf();
        *self.0.log_file.lock() = log_file;
        *self.0.rest_port.lock() = rest_port;
        *self.0.ws_port.lock() = ws_port;
        *self.0.api_keys.lock() = api_keys.into_iter().collect();
        *self.0.app_config.lock() = Some(app_config);
        *self.0.core_config.lock() = Some(core_config);
        *self.0.logger.write() = Some(logger);
        *self.0.started_at.lock() = Some(Utc::now());
        *self.0.cancellation.lock() = CancellationToken::new();
        self.0.reload_requested.store(false, Ordering::SeqCst);

        self.set_phase(HostPhase::Ready);
        self.log(LogLevel::Info, "host initialized");
        Ok(())
    }

    /// `Start()`
    pub async fn start(&self) -> Result<(), SupervisorError> {
        self.require_phase(HostPhase::Ready, "Start")?;

        self.load_units().await;

        let (host, port) = {
            let cfg = self.0.core_config.lock();
            let cfg = cfg.as_ref().expect("core config set by Initialize");
            (cfg.rest_host.clone(), *self.0.rest_port.lock())
        };
        let mut http_monitor = agni_http::HttpMonitor::new(host, port);
        let api_keys = self.0.api_keys.lock().clone();
        http_monitor
            .start(Arc::new(self.clone()) as Arc<dyn HttpController>, api_keys)
            .await?;
        *self.0.http_monitor.lock().await = Some(http_monitor);

        self.refresh_info_snapshot().await;
        self.refresh_status_snapshot().await;
        self.spawn_refreshers();
        self.spawn_status_broadcaster();

        self.set_phase(HostPhase::Running);
        self.log(LogLevel::Info, "host started");
        Ok(())
    }

    /// `Stop()`: stops units (sequential, interleaved), the WS monitor, then
    /// the HTTP monitor. Never returns an error — failures are logged, per
    /// the source's silent panic recovery.
    pub async fn stop(&self) {
        self.set_phase(HostPhase::Stopping);

        if let Some(token) = self.0.refreshers_stop.lock().take() {
            token.cancel();
        }
        self.stop_units().await;

        if let Some(token) = self.0.broadcaster_stop.lock().take() {
            token.cancel();
        }

        if let Some(mut ws_monitor) = self.0.ws_monitor.lock().await.take() {
            ws_monitor.stop().await;
            *self.0.ws_hub.lock() = None;
        }

        if let Some(mut http_monitor) = self.0.http_monitor.lock().await.take() {
            http_monitor.stop().await;
        }

        self.log(LogLevel::Info, "host stopped");
        self.set_phase(HostPhase::Stopped);
    }

    /// `Terminate()`: broadcasts shutdown to every waiter holding the
    /// cancellation token. Calling this twice on an already-cancelled
    /// token is a caller bug with no defined behavior, matching the
    /// source's `close(stopChan)` semantics.
    pub fn terminate(&self) {
        self.0.cancellation.lock().cancel();
    }

    /// `WaitforClose()`
    pub async fn wait_for_close(&self) {
        self.0.routines.wait_for_close().await;
    }

    /// `DeInitialize()`
    pub async fn deinitialize(&self) {
        if let Some(mut logger) = self.0.logger.write().take() {
            logger.stop().await;
        }
        *self.0.main_path.lock() = PathBuf::new();
        *self.0.app_config_dir.lock() = PathBuf::new();
        *self.0.log_path.lock() = PathBuf::new();
        *self.0.log_file.lock() = PathBuf::new();
        *self.0.core_config.lock() = None;
        *self.0.app_config.lock() = None;
        self.0.api_keys.lock().clear();
        *self.0.started_at.lock() = None;
        *self.0.info_snapshot.lock() = AppInfo::default();
        *self.0.status_snapshot.lock() = AppStatus::default();
        self.0.prev_mem_bytes.store(0, Ordering::SeqCst);
        self.set_phase(HostPhase::New);
    }

    /// `Reload_Config()`
    pub async fn reload_config(&self) -> Result<(), SupervisorError> {
        self.require_phase(HostPhase::Running, "Reload_Config")?;
        let app_config_dir = self.0.app_config_dir.lock().clone();
        let fresh = agni_files::read_app_config(&agni_files::paths::app_config_path(&app_config_dir))
            .await
            .map_err(SupervisorError::AppConfig)?;
        *self.0.app_config.lock() = Some(fresh);
        self.0.reload_requested.store(true, Ordering::SeqCst);
        self.log(LogLevel::Info, "app configuration reloaded");
        Ok(())
    }

    /// `Save_App_Config(bytes)`
    pub async fn save_app_config(&self, bytes: &[u8]) -> Result<(), SupervisorError> {
        let app_config_dir = self.0.app_config_dir.lock().clone();
        match agni_files::save_app_config(&agni_files::paths::app_config_path(&app_config_dir), bytes).await {
            Ok(cfg) => {
                *self.0.app_config.lock() = Some(cfg);
                Ok(())
            }
            Err(e) => {
                if matches!(e, agni_files::FilesError::InvalidConfig(_)) {
                    self.log(LogLevel::Error, "invalid application configuration received");
                }
                Err(SupervisorError::AppConfig(e))
            }
        }
    }

    pub fn reload_requested(&self) -> bool {
        self.0.reload_requested.load(Ordering::SeqCst)
    }

    pub fn add_routine(&self) -> agni_core::routines::RoutineGuard {
        self.0.routines.add()
    }

    pub fn routine_count(&self) -> u16 {
        self.0.routines.count()
    }

    fn log(&self, level: LogLevel, message: &str) {
        if let Some(hub) = self.0.ws_hub.lock().clone() {
            let line = format!("{} [{}] {}", Utc::now().to_rfc3339(), level.as_str(), message);
            tokio::spawn(async move {
                hub.broadcast(MonitorClass::Log, line).await;
            });
        }
        if let Some(logger) = self.0.logger.read().as_ref() {
            logger.write_log(LogMessage::new(level, message.to_string()));
        }
    }

    async fn load_units(&self) {
        let app_config = self.0.app_config.lock().clone().unwrap_or_default();
        let mut units = Vec::new();

        for unit_cfg in &app_config.units {
            if !unit_cfg.is_enabled() {
                warn!(unit = %unit_cfg.name, "unit disabled, skipping");
                continue;
            }
            let pool_size = unit_cfg.clamped_pool_size();
            if pool_size == 0 {
                warn!(unit = %unit_cfg.name, "unit pool size is 0, skipping");
                continue;
            }
            info!(unit = %unit_cfg.name, pool_size, "Found {} pool setting for appunit {}", pool_size, unit_cfg.name);

            for pool_index in 0..pool_size as usize {
                let pool_global_index = units.len();
                let load_result = self
                    .0
                    .plugin_loader
                    .load_application_unit(&unit_cfg.plugin_path, APPLICATION_UNIT_SYMBOL);
                let mut unit = match load_result {
                    Ok(unit) => unit,
                    Err(e) => {
                        error!(unit = %unit_cfg.name, path = %unit_cfg.plugin_path, error = %e, "failed to load unit plug-in");
                        continue;
                    }
                };

                let init_result = unit
                    .initialize(
                        Arc::new(self.clone()) as Arc<dyn HostCapabilities>,
                        pool_global_index,
                        &unit_cfg.name,
                        &unit_cfg.plugin_path,
                        &unit_cfg.config_path,
                    )
                    .await;
                if let Err(e) = init_result {
                    error!(unit = %unit_cfg.name, pool_index, error = %e, "unit initialize failed");
                    continue;
                }
                if let Err(e) = unit.start().await {
                    error!(unit = %unit_cfg.name, pool_index, error = %e, "unit start failed");
                    continue;
                }

                units.push(UnitHandle {
                    name: unit_cfg.name.clone(),
                    pool_index,
                    plugin_path: unit_cfg.plugin_path.clone(),
                    config_path: unit_cfg.config_path.clone(),
                    enabled: true,
                    pool_size: pool_size as usize,
                    unit: Arc::new(tokio::sync::Mutex::new(unit)),
                });
            }
        }

        if units.is_empty() {
            warn!("no application units loaded");
        } else {
            info!(count = units.len(), "loaded and started unit pool");
        }
        *self.0.units.lock().await = units;
    }

    async fn stop_units(&self) {
        let mut units = self.0.units.lock().await;
        for unit in units.iter() {
            if !unit.is_started().await {
                warn!(unit = %unit.name, "unit not started, skipping stop");
                continue;
            }
            if let Err(e) = unit.unit.lock().await.stop().await {
                error!(unit = %unit.name, error = %e, "unit stop failed");
            }
            tokio::time::sleep(STOP_UNITS_INTERLEAVE).await;
        }
        units.clear();
    }

    pub async fn start_ws_monitor(&self) -> Result<(), SupervisorError> {
        let mut ws_monitor = self.0.ws_monitor.lock().await;
        if ws_monitor.is_some() {
            return Ok(());
        }
        let (host, port) = {
            let cfg = self.0.core_config.lock();
            let cfg = cfg.as_ref().expect("core config set by Initialize");
            (cfg.ws_host.clone(), *self.0.ws_port.lock())
        };
        let mut monitor = WsMonitor::new(host, port);
        monitor.start().await?;
        *self.0.ws_hub.lock() = monitor.hub();
        *ws_monitor = Some(monitor);
        Ok(())
    }

    pub async fn stop_ws_monitor(&self) -> Result<(), SupervisorError> {
        if let Some(mut monitor) = self.0.ws_monitor.lock().await.take() {
            monitor.stop().await;
        }
        *self.0.ws_hub.lock() = None;
        Ok(())
    }

    async fn refresh_info_snapshot(&self) {
        let units = self.0.units.lock().await;
        let app_units = collect_unit_info(&units).await;
        drop(units);

        let main_path = self.0.main_path.lock().display().to_string();
        let app_config_path = self.0.app_config_dir.lock().display().to_string();
        let log_path = self.0.log_path.lock().display().to_string();
        let log_file = self.0.log_file.lock().display().to_string();
        let started_at = *self.0.started_at.lock();

        let info = AppInfo {
            app_id: self.app_id(),
            app_name: self.app_name(),
            app_version: self.0.app_version.clone(),
            pid: self.0.pid,
            started_at,
            main_path,
            app_config_path,
            log_path,
            log_file,
            app_units,
        };
        *self.0.info_snapshot.lock() = info;
    }

    async fn refresh_status_snapshot(&self) {
        let units = self.0.units.lock().await;
        let unit_infos = collect_unit_info(&units).await;
        drop(units);

        let started_at = *self.0.started_at.lock();
        let uptime_seconds = started_at
            .map(|started| (Utc::now() - started).num_seconds().max(0) as u64)
            .unwrap_or(0);

        let mem_alloc = current_rss_bytes();
        let previous = self.0.prev_mem_bytes.swap(mem_alloc, Ordering::SeqCst);
        let mem_delta = mem_alloc.abs_diff(previous);

        let status = AppStatus {
            uptime_seconds,
            mem_alloc_bytes: mem_alloc,
            mem_total_bytes: mem_alloc,
            mem_delta_bytes: mem_delta,
            no_of_routines: self.0.routines.count(),
            requests_handled: self.0.counters.handled(),
            requests_failed: self.0.counters.failed(),
            units: unit_infos,
        };
        *self.0.status_snapshot.lock() = status;
    }

    fn spawn_refreshers(&self) {
        let stop = CancellationToken::new();
        *self.0.refreshers_stop.lock() = Some(stop.clone());

        let host = self.clone();
        let guard = self.add_routine();
        tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(SNAPSHOT_REFRESH_INTERVAL);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        host.refresh_info_snapshot().await;
                        host.refresh_status_snapshot().await;
                    }
                }
            }
        });
    }

    fn spawn_status_broadcaster(&self) {
        let stop = CancellationToken::new();
        *self.0.broadcaster_stop.lock() = Some(stop.clone());

        let host = self.clone();
        let shutdown = self.0.cancellation.lock().clone();
        let guard = self.add_routine();
        tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(STATUS_BROADCAST_INTERVAL);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let hub = host.0.ws_hub.lock().clone();
                        if let Some(hub) = hub {
                            if hub.class_count(MonitorClass::Status).await > 0 {
                                let status = host.0.status_snapshot.lock().clone();
                                if let Ok(json) = serde_json::to_string(&status) {
                                    hub.broadcast(MonitorClass::Status, json).await;
                                }
                            }
                        }
                    }
                }
            }
        });
    }
}

async fn collect_unit_info(units: &[UnitHandle]) -> Vec<AppUnitInfo> {
    let mut infos = Vec::with_capacity(units.len());
    for unit in units {
        infos.push(AppUnitInfo {
            name: unit.name.clone(),
            pool: unit.pool_index,
            enabled: unit.enabled,
            started: unit.is_started().await,
            info: unit.info().await,
            status: unit.status().await,
        });
    }
    infos
}

impl HostCapabilities for Host {
    fn log(&self, level: LogLevel, message: &str) {
        Host::log(self, level, message)
    }

    fn add_request_handled(&self) {
        self.0.counters.add_handled();
    }

    fn add_request_failed(&self) {
        self.0.counters.add_failed();
    }

    fn is_cancelled(&self) -> bool {
        self.0.cancellation.lock().is_cancelled()
    }
}

#[async_trait]
impl HttpController for Host {
    fn info(&self) -> Value {
        serde_json::to_value(self.0.info_snapshot.lock().clone()).unwrap_or(Value::Null)
    }

    fn status(&self) -> Value {
        serde_json::to_value(self.0.status_snapshot.lock().clone()).unwrap_or(Value::Null)
    }

    async fn start_ws_monitor(&self) -> Result<(), String> {
        Host::start_ws_monitor(self).await.map_err(|e| e.to_string())
    }

    async fn stop_ws_monitor(&self) -> Result<(), String> {
        Host::stop_ws_monitor(self).await.map_err(|e| e.to_string())
    }

    async fn reload_config(&self) -> Result<(), String> {
        Host::reload_config(self).await.map_err(|e| e.to_string())
    }

    async fn save_app_config(&self, body: &[u8]) -> Result<(), String> {
        Host::save_app_config(self, body).await.map_err(|e| e.to_string())
    }

    fn set_log_level(&self, level: LogLevel) {
        if let Some(logger) = self.0.logger.read().as_ref() {
            logger.set_log_level(level);
        }
    }

    fn list_units(&self) -> Value {
        serde_json::to_value(&self.0.app_config.lock().clone().unwrap_or_default().units)
            .unwrap_or(Value::Null)
    }

    fn unit_status(&self, name: &str) -> Option<Value> {
        let units = self.0.info_snapshot.lock();
        units
            .app_units
            .iter()
            .find(|u| u.name == name)
            .map(|u| serde_json::to_value(u).unwrap_or(Value::Null))
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").field("phase", &self.phase()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agni_core::UnitConfig;
    use tempfile::tempdir;

    struct TestFixture {
        main_path: PathBuf,
        app_path: PathBuf,
        _dir: tempfile::TempDir,
    }

    async fn setup(units: Vec<UnitConfig>) -> TestFixture {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("config");
        tokio::fs::create_dir_all(&config_dir).await.unwrap();

        let core_config = CoreConfig {
            app_name: "agnihost-test".into(),
            app_id: "agnihost-test".into(),
            rest_host: "127.0.0.1".into(),
            rest_port: 0,
            ws_host: "127.0.0.1".into(),
            ws_port: 0,
            log_path: None,
            plugins: Default::default(),
        };
        tokio::fs::write(
            config_dir.join("core.config"),
            serde_json::to_vec(&core_config).unwrap(),
        )
        .await
        .unwrap();
        tokio::fs::write(config_dir.join("apikeys.config"), b"test-api-key\n")
            .await
            .unwrap();

        let app_config = AppConfig { units };
        tokio::fs::write(
            dir.path().join("app.config"),
            serde_json::to_vec(&app_config).unwrap(),
        )
        .await
        .unwrap();

        TestFixture {
            main_path: dir.path().to_path_buf(),
            app_path: dir.path().to_path_buf(),
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn full_lifecycle_drains_every_routine_token() {
        let fixture = setup(vec![]).await;
        let host = Host::new("0.1.0-test", 4242);

        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();
        assert_eq!(host.phase(), HostPhase::Ready);

        host.start().await.unwrap();
        assert_eq!(host.phase(), HostPhase::Running);
        assert!(host.routine_count() > 0, "snapshot refreshers/broadcaster should be running");

        host.terminate();
        host.stop().await;
        assert_eq!(host.phase(), HostPhase::Stopped);

        host.wait_for_close().await;
        assert_eq!(host.routine_count(), 0, "testable property 1: routine counter is 0 after WaitforClose");

        host.deinitialize().await;
        assert_eq!(host.phase(), HostPhase::New);
    }

    #[tokio::test]
    async fn disabled_and_missing_plugin_units_are_skipped_not_fatal() {
        let units = vec![
            UnitConfig {
                name: "disabled-unit".into(),
                enable: 0,
                pool_size: 2,
                plugin_path: "./does-not-matter.so".into(),
                config_path: "./disabled.json".into(),
            },
            UnitConfig {
                name: "missing-plugin-unit".into(),
                enable: 1,
                pool_size: 1,
                plugin_path: "/nonexistent/plugin.so".into(),
                config_path: "./missing.json".into(),
            },
        ];
        let fixture = setup(units).await;
        let host = Host::new("0.1.0-test", 4243);

        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();
        host.start().await.unwrap();

        let info: AppInfo = serde_json::from_value(HttpController::info(&host)).unwrap();
        assert!(
            info.app_units.is_empty(),
            "a disabled unit and a unit whose plug-in can't load should both leave the pool empty, not crash Start"
        );

        host.terminate();
        host.stop().await;
        host.wait_for_close().await;
        host.deinitialize().await;
    }

    #[tokio::test]
    async fn counters_reflect_every_recorded_call() {
        let fixture = setup(vec![]).await;
        let host = Host::new("0.1.0-test", 4244);
        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();

        for _ in 0..5 {
            host.add_request_handled();
        }
        for _ in 0..2 {
            host.add_request_failed();
        }
        assert_eq!(host.0.counters.handled(), 5);
        assert_eq!(host.0.counters.failed(), 2);

        host.deinitialize().await;
    }

    #[tokio::test]
    async fn save_then_reload_round_trips_the_unit_list() {
        let fixture = setup(vec![]).await;
        let host = Host::new("0.1.0-test", 4245);
        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();
        host.start().await.unwrap();

        let new_config = AppConfig {
            units: vec![UnitConfig {
                name: "fresh-unit".into(),
                enable: 1,
                pool_size: 1,
                plugin_path: "./fresh.so".into(),
                config_path: "./fresh.json".into(),
            }],
        };
        let bytes = serde_json::to_vec(&new_config).unwrap();

        host.save_app_config(&bytes).await.unwrap();
        assert!(!host.reload_requested());

        host.reload_config().await.unwrap();
        assert!(host.reload_requested(), "testable property 7: reload sets the flag for the next cycle");

        let units_value = HttpController::list_units(&host);
        let units: Vec<UnitConfig> = serde_json::from_value(units_value).unwrap();
        assert_eq!(units, new_config.units);

        host.terminate();
        host.stop().await;
        host.wait_for_close().await;
        host.deinitialize().await;
    }

    #[tokio::test]
    async fn save_app_config_with_invalid_json_leaves_reload_flag_untouched() {
        let fixture = setup(vec![]).await;
        let host = Host::new("0.1.0-test", 4246);
        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();

        let err = host.save_app_config(b"not json").await.unwrap_err();
        assert!(matches!(err, SupervisorError::AppConfig(_)));
        assert!(!host.reload_requested());

        host.deinitialize().await;
    }

    #[tokio::test]
    async fn operations_reject_the_wrong_phase() {
        let fixture = setup(vec![]).await;
        let host = Host::new("0.1.0-test", 4247);

        let err = host.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::WrongPhase { .. }));

        host.initialize(&fixture.main_path, &fixture.app_path, &fixture.main_path, None, None)
            .await
            .unwrap();
        let err = host.reload_config().await.unwrap_err();
        assert!(matches!(err, SupervisorError::WrongPhase { .. }));

        host.deinitialize().await;
    }
}
