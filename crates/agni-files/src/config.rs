use std::path::Path;

use agni_core::{AppConfig, CoreConfig};
use tracing::debug;

use crate::error::FilesError;

/// Reads and parses `core.config`. Fatal at `Initialize` if the file is
/// missing or malformed, per `spec.md` §4.1.
pub async fn read_core_config(path: &Path) -> Result<CoreConfig, FilesError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FilesError::io(path.display().to_string(), e))?;
    let cfg: CoreConfig = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), "loaded core config");
    Ok(cfg)
}

/// Reads and parses `app.config`. Used both by `Initialize` and by
/// `Reload_Config`.
pub async fn read_app_config(path: &Path) -> Result<AppConfig, FilesError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FilesError::io(path.display().to_string(), e))?;
    let cfg: AppConfig = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), units = cfg.units.len(), "loaded app config");
    Ok(cfg)
}

/// `Save_App_Config`: validates `bytes` parse as a well-formed `AppConfig`
/// before writing it to disk. On invalid JSON the on-disk file is left
/// untouched, matching `spec.md` §8 scenario 5.
pub async fn save_app_config(path: &Path, bytes: &[u8]) -> Result<AppConfig, FilesError> {
    let cfg: AppConfig = serde_json::from_slice(bytes)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| FilesError::io(path.display().to_string(), e))?;
    Ok(cfg)
}
