use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilesError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid application configuration received: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("command {program} failed: {message}")]
    Command { program: String, message: String },
}

impl FilesError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
