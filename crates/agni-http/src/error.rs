use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http monitor is already started")]
    AlreadyStarted,

    #[error("invalid http monitor bind address {0}")]
    InvalidAddress(String),

    #[error("http monitor server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("failed to load api keys: {0}")]
    ApiKeys(#[from] agni_files::FilesError),
}
