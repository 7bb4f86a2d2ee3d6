use thiserror::Error;

/// Top-level error type for the Songo training system.
///
/// Programmer errors (an invalid move handed to `execute_move`, a feature
/// vector of the wrong length) are bugs and panic instead of surfacing here.
#[derive(Error, Debug)]
pub enum SongoError {
    #[error("evaluator error: {0}")]
    Evaluator(String),

    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("example buffer error: {0}")]
    Examples(#[from] bincode::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type SongoResult<T> = Result<T, SongoError>;
