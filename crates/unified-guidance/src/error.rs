use unified_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CoreError),

    #[error("config error: {0}")]
    Config(String),
}
