//! Process entry point: parses CLI flags, builds the Tokio runtime with
//! the requested core count, then drives the
//! `Initialize -> Start -> wait-for-signal -> cancel -> Stop -> sleep(5s)
//! -> Terminate -> WaitforClose -> DeInitialize [-> Initialize if
//! reload_requested]` loop described in `spec.md` §4.1, grounded on
//! `original_source/src/app.go`'s `main` (the `goto start` reload loop).

mod cli;
mod signals;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agni_supervisor::Host;
use cli::Cli;

const DEFAULT_LOG_PATH: &str = "/var/log/app/";
const TERMINATE_GRACE: Duration = Duration::from_secs(5);
const POST_WAIT_SETTLE: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let worker_threads = cli.resolved_cpu_count();
    info!(worker_threads, "starting agnihostd");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to build async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let main_path = match cli.resolved_main_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("failed to resolve main_path: {e}");
            return ExitCode::FAILURE;
        }
    };
    let app_path = cli.resolved_app_path(&main_path);
    let log_path = resolve_log_path(&cli.log_path, &main_path).await;

    let pid = std::process::id();
    let mut reload_requested;

    loop {
        let host = Host::new(env!("CARGO_PKG_VERSION"), pid);

        if let Err(e) = host
            .initialize(&main_path, &app_path, &log_path, cli.rest_port, cli.ws_port)
            .await
        {
            error!(error = %e, "initialization failed, agnihostd is terminating");
            return ExitCode::FAILURE;
        }
        info!("initializing agnihostd ............  DONE");

        if let Err(e) = host.start().await {
            error!(error = %e, "start failed");
            return ExitCode::FAILURE;
        }
        info!(app = %host.app_name(), "started agnihostd");

        signals::wait_for_shutdown_signal().await;

        host.terminate();
        info!("signalling the unit(s) to stop");
        host.stop().await;
        tokio::time::sleep(TERMINATE_GRACE).await;

        info!("flagging all routines to stop");
        host.wait_for_close().await;
        info!("all routines terminated");
        tokio::time::sleep(POST_WAIT_SETTLE).await;

        reload_requested = host.reload_requested();
        info!("stopped agnihostd");
        host.deinitialize().await;

        if !reload_requested {
            break;
        }
        info!("application reload requested, reloading agnihostd");
    }

    info!("agnihostd terminated");
    ExitCode::SUCCESS
}

/// `log_path` defaults to the core config's `LogPath` field, falling back
/// to `/var/log/app/` when the config doesn't set one either — `spec.md`
/// §6's "defaults: ... log_path ← core config or `/var/log/app/`".
///
/// Reads `core.config` once more than `Host::initialize` will; both reads
/// are idempotent and the file is trusted to be stable between them.
async fn resolve_log_path(explicit: &Option<PathBuf>, main_path: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.clone();
    }
    let core_config_path = agni_files::paths::core_config_path(main_path);
    match agni_files::read_core_config(&core_config_path).await {
        Ok(cfg) => cfg
            .log_path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
        Err(_) => PathBuf::from(DEFAULT_LOG_PATH),
    }
}
