use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::require_api_key;
use crate::controller::HttpController;
use crate::error::HttpError;
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<dyn HttpController>,
    pub api_keys: Arc<HashSet<String>>,
}

fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/info", get(routes::info))
        .route("/status", get(routes::status))
        .route("/admin/monitor/start", get(routes::monitor_start))
        .route("/admin/monitor/stop", get(routes::monitor_stop))
        .route("/admin/config/reload", get(routes::config_reload))
        .route("/admin/config/save", post(routes::config_save))
        .route("/admin/log/setlevel", get(routes::log_setlevel))
        .route("/admin/units", get(routes::units_list))
        .route("/admin/unit/stop", get(routes::unit_stop))
        .route("/admin/unit/{name}/start", get(routes::unit_start))
        .route("/admin/unit/{name}/restart", get(routes::unit_restart))
        .route("/admin/unit/{name}/status", get(routes::unit_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/live", get(routes::live))
        .merge(protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Owns the REST control-plane HTTP server. `host`/`port` come from core
/// config, overridden by CLI flags at the binary's entry point.
pub struct HttpMonitor {
    host: String,
    port: u16,
    server_task: Option<JoinHandle<()>>,
}

impl HttpMonitor {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            server_task: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.server_task.is_some()
    }

    pub async fn start(
        &mut self,
        controller: Arc<dyn HttpController>,
        api_keys: HashSet<String>,
    ) -> Result<(), HttpError> {
        if self.is_started() {
            return Err(HttpError::AlreadyStarted);
        }

        let state = AppState {
            controller,
            api_keys: Arc::new(api_keys),
        };
        let router = build_router(state);

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| HttpError::InvalidAddress(format!("{}:{}", self.host, self.port)))?;
        let listener = TcpListener::bind(addr).await?;

        let server_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "http monitor server exited with an error");
            }
        });

        info!(host = %self.host, port = self.port, "http monitor started");
        self.server_task = Some(server_task);
        Ok(())
    }

    /// `Server.Shutdown(context.TODO())` equivalent: aborts the listener
    /// task. Outstanding requests already past the routing layer finish on
    /// their own task and are not interrupted.
    pub async fn stop(&mut self) {
        if let Some(task) = self.server_task.take() {
            task.abort();
            let _ = task.await;
        }
        info!("http monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agni_core::LogLevel;
    use async_trait::async_trait;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StubController;

    #[async_trait]
    impl HttpController for StubController {
        fn info(&self) -> Value {
            json!({"AppName": "demo"})
        }
        fn status(&self) -> Value {
            json!({"Uptime": 1})
        }
        async fn start_ws_monitor(&self) -> Result<(), String> {
            Ok(())
        }
        async fn stop_ws_monitor(&self) -> Result<(), String> {
            Ok(())
        }
        async fn reload_config(&self) -> Result<(), String> {
            Ok(())
        }
        async fn save_app_config(&self, _body: &[u8]) -> Result<(), String> {
            Ok(())
        }
        fn set_log_level(&self, _level: LogLevel) {}
        fn list_units(&self) -> Value {
            json!([])
        }
        fn unit_status(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    fn test_state() -> AppState {
        AppState {
            controller: Arc::new(StubController),
            api_keys: Arc::new(HashSet::from(["secret".to_string()])),
        }
    }

    #[tokio::test]
    async fn live_requires_no_auth() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::get("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_without_api_key_is_unauthorized() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn status_with_valid_api_key_succeeds() {
        let router = build_router(test_state());
        let response = router
            .oneshot(
                Request::get("/status")
                    .header("apikey", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn config_save_with_empty_body_returns_no_content() {
        let router = build_router(test_state());
        let response = router
            .oneshot(
                Request::post("/admin/config/save")
                    .header("apikey", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn log_setlevel_without_query_param_is_bad_request() {
        let router = build_router(test_state());
        let response = router
            .oneshot(
                Request::get("/admin/log/setlevel")
                    .header("apikey", "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
