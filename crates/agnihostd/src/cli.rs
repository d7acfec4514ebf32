use std::path::{Path, PathBuf};

use clap::Parser;

/// `spec.md` §6: all flags optional. Defaults for `main_path`/`app_path`/
/// `log_path` are resolved after parsing (they depend on the executable's
/// own location and, for `log_path`, on the core config once it is read),
/// so they are left as `Option` here rather than given `clap` defaults.
#[derive(Debug, Parser)]
#[command(
    name = "agnihostd",
    version,
    about = "Application framework host: supervises unit plug-ins and exposes a control plane."
)]
pub struct Cli {
    /// Base/root path of the application. Defaults to the executable's directory.
    #[arg(long = "main_path")]
    pub main_path: Option<PathBuf>,

    /// Path that app.config (the unit list) lives in. Defaults to `main_path`.
    #[arg(long = "app_path")]
    pub app_path: Option<PathBuf>,

    /// Path the host writes its log file into. Defaults to the core
    /// config's `LogPath`, falling back to `/var/log/app/`.
    #[arg(long = "log_path")]
    pub log_path: Option<PathBuf>,

    /// Number of CPU cores to use for the async runtime. `0` means all
    /// available cores; values above the available count are clamped.
    #[arg(long = "cpu_count", default_value_t = 0)]
    pub cpu_count: usize,

    /// TCP port for the REST control plane. Overrides core config.
    #[arg(long = "rest_port")]
    pub rest_port: Option<u16>,

    /// TCP port for the WebSocket monitor. Overrides core config.
    #[arg(long = "ws_port")]
    pub ws_port: Option<u16>,
}

impl Cli {
    /// Clamps `cpu_count` to the machine's available parallelism; `0`
    /// (the default) resolves to every available core, per `spec.md` §6.
    pub fn resolved_cpu_count(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if self.cpu_count == 0 {
            available
        } else {
            self.cpu_count.min(available)
        }
    }

    /// `main_path` defaults to the directory containing the running
    /// executable.
    pub fn resolved_main_path(&self) -> anyhow::Result<PathBuf> {
        match &self.main_path {
            Some(p) => Ok(p.clone()),
            None => {
                let exe = std::env::current_exe()?;
                Ok(exe
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            }
        }
    }

    /// `app_path` defaults to `main_path` when not given.
    pub fn resolved_app_path(&self, main_path: &Path) -> PathBuf {
        self.app_path.clone().unwrap_or_else(|| main_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_count_zero_resolves_to_available_parallelism() {
        let cli = Cli::parse_from(["agnihostd", "--cpu_count", "0"]);
        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(cli.resolved_cpu_count(), available);
    }

    #[test]
    fn cpu_count_above_available_is_clamped() {
        let cli = Cli::parse_from(["agnihostd", "--cpu_count", "999999"]);
        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(cli.resolved_cpu_count(), available);
    }

    #[test]
    fn app_path_defaults_to_main_path() {
        let cli = Cli::parse_from(["agnihostd"]);
        let main = PathBuf::from("/opt/agnihost");
        assert_eq!(cli.resolved_app_path(&main), main);
    }

    #[test]
    fn app_path_override_is_respected() {
        let cli = Cli::parse_from(["agnihostd", "--app_path", "/srv/units"]);
        let main = PathBuf::from("/opt/agnihost");
        assert_eq!(cli.resolved_app_path(&main), PathBuf::from("/srv/units"));
    }
}
