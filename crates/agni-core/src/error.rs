use thiserror::Error;

/// Errors shared across the host kernel's building blocks. Per `spec.md`
/// §7's taxonomy: configuration errors are fatal at `Initialize` and
/// surfaced as HTTP 4xx elsewhere; plug-in/unit runtime errors are logged
/// and the affected slot is skipped, never propagated as a process crash.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid application configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    #[error("unit initialize failed: {0}")]
    UnitInitialize(String),

    #[error("unit start failed: {0}")]
    UnitStart(String),

    #[error("unit stop failed: {0}")]
    UnitStop(String),

    #[error("plug-in load failed: {0}")]
    PluginLoad(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
