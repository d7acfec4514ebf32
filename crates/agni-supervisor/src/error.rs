use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("operation not valid in phase {phase}: {operation}")]
    WrongPhase { phase: &'static str, operation: &'static str },

    #[error("core config error: {0}")]
    CoreConfig(#[source] agni_files::FilesError),

    #[error("app config error: {0}")]
    AppConfig(#[source] agni_files::FilesError),

    #[error("logger error: {0}")]
    Logger(#[from] agni_logger::LoggerError),

    #[error("http monitor error: {0}")]
    Http(#[from] agni_http::HttpError),

    #[error("ws monitor error: {0}")]
    Ws(#[from] agni_ws::WsError),

    #[error("api keys error: {0}")]
    ApiKeys(#[source] agni_files::FilesError),
}
