//! Error types for the irrigation engine.

/// Top-level error type for the scheduling and actuation engine.
#[derive(Debug, thiserror::Error)]
pub enum FurrowError {
    /// Schedule entry validation error.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Immediate run request validation error.
    #[error("request error: {0}")]
    Request(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Engine lifecycle or query error.
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FurrowError>;
