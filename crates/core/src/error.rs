#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No stock ticker provided")]
    MissingTicker,

    #[error("Invalid stock ticker: {0}")]
    InvalidTicker(String),

    #[error("Invalid LLM provider: {0}")]
    InvalidProvider(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
