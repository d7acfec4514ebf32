use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsError {
    #[error("ws monitor is already started")]
    AlreadyStarted,

    #[error("ws monitor http server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("invalid ws monitor bind address {0}")]
    InvalidAddress(String),
}
