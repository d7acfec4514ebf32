use std::path::{Path, PathBuf};

/// `<main_path>/config/core.config`
pub fn core_config_path(main_path: &Path) -> PathBuf {
    main_path.join("config").join("core.config")
}

/// `<main_path>/config/apikeys.config`
pub fn apikeys_path(main_path: &Path) -> PathBuf {
    main_path.join("config").join("apikeys.config")
}

/// `<app_path>/app.config`
///
/// `spec.md` §9 flags this as an inconsistent path composition in the
/// source: `Initialize` receives `app_path` as a directory, but
/// `Reload_Config` parses from `<app_path>/app.config` directly. This
/// helper is the single place that composition happens, resolving the
/// ambiguity explicitly per `SPEC_FULL.md`.
pub fn app_config_path(app_path: &Path) -> PathBuf {
    app_path.join("app.config")
}

/// `<log_path>/<app_id>.log`
pub fn log_file_path(log_path: &Path, app_id: &str) -> PathBuf {
    log_path.join(format!("{app_id}.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_expected_paths() {
        let main = Path::new("/opt/agnihost");
        assert_eq!(
            core_config_path(main),
            PathBuf::from("/opt/agnihost/config/core.config")
        );
        assert_eq!(
            apikeys_path(main),
            PathBuf::from("/opt/agnihost/config/apikeys.config")
        );
        assert_eq!(
            app_config_path(main),
            PathBuf::from("/opt/agnihost/app.config")
        );
        assert_eq!(
            log_file_path(Path::new("/var/log/app"), "agni-demo"),
            PathBuf::from("/var/log/app/agni-demo.log")
        );
    }
}
