use std::net::SocketAddr;

use agni_core::MonitorClass;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::client::run_client;
use crate::error::WsError;
use crate::hub::{Hub, HubHandle};

#[derive(Clone)]
struct MonitorState {
    hub: HubHandle,
}

fn default_client_html(title: &str, path: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html>
<head><title>{title}</title></head>
<body>
<pre id="log"></pre>
<script>
const out = document.getElementById("log");
const proto = (location.protocol === "https:") ? "wss://" : "ws://";
const ws = new WebSocket(proto + location.host + "{path}");
ws.onmessage = (event) => {{ out.textContent += event.data + "\n"; }};
</script>
</body>
</html>"#
    ))
}

async fn wsmonitor_page() -> impl IntoResponse {
    default_client_html("Activity Monitor", "/app/monitor")
}

async fn wsstatus_page() -> impl IntoResponse {
    default_client_html("Status Monitor", "/app/status")
}

async fn wslogger_page() -> impl IntoResponse {
    default_client_html("Log Monitor", "/app/logger")
}

async fn app_monitor(State(state): State<MonitorState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_client(socket, state.hub, MonitorClass::Activity))
}

async fn app_status(State(state): State<MonitorState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_client(socket, state.hub, MonitorClass::Status))
}

async fn app_logger(State(state): State<MonitorState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_client(socket, state.hub, MonitorClass::Log))
}

/// Owns the hub and the HTTP server exposing the upgrade endpoints. `Start`
/// spawns both; `Stop` closes the hub first, then tears down the server —
/// matching `spec.md` §4.4's lifecycle note.
pub struct WsMonitor {
    host: String,
    port: u16,
    hub: Option<HubHandle>,
    hub_task: Option<JoinHandle<()>>,
    server_task: Option<JoinHandle<()>>,
}

impl WsMonitor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            hub: None,
            hub_task: None,
            server_task: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.hub.is_some()
    }

    pub fn hub(&self) -> Option<HubHandle> {
        self.hub.clone()
    }

    pub async fn start(&mut self) -> Result<(), WsError> {
        if self.is_started() {
            return Err(WsError::AlreadyStarted);
        }

        let (hub, hub_task) = Hub::spawn();
        let state = MonitorState { hub: hub.clone() };
        let router = Router::new()
            .route("/wsmonitor", get(wsmonitor_page))
            .route("/wsstatus", get(wsstatus_page))
            .route("/wslogger", get(wslogger_page))
            .route("/app/monitor", get(app_monitor))
            .route("/app/status", get(app_status))
            .route("/app/logger", get(app_logger))
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| WsError::InvalidAddress(format!("{}:{}", self.host, self.port)))?;
        let listener = TcpListener::bind(addr).await?;

        let server_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "ws monitor server exited with an error");
            }
        });

        info!(host = %self.host, port = self.port, "ws monitor started");
        self.hub = Some(hub);
        self.hub_task = Some(hub_task);
        self.server_task = Some(server_task);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(hub) = self.hub.take() {
            hub.stop().await;
        }
        if let Some(task) = self.hub_task.take() {
            let _ = task.await;
        }
        if let Some(task) = self.server_task.take() {
            task.abort();
        }
        info!("ws monitor stopped");
    }
}
