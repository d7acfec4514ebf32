use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("logger io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger is already started")]
    AlreadyStarted,
}
