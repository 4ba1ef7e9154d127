use thiserror::Error;

/// Every failure the dashboard can surface.
///
/// Each variant maps to a process exit code so `main` stays a one-liner.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Bad environment or CLI configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local file could not be opened, read or written.
    #[error("{0}")]
    Io(String),

    /// HTTP request failed or returned a non-success status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Source data did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unknown dataset/display/authority label, or an incomplete combination.
    #[error("{0}")]
    InvalidSelection(String),

    /// The merged monthly series has gaps or duplicates.
    ///
    /// Signals an upstream data change that needs a human to look at it.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::InvalidSelection(_) => 2,
            AppError::Io(_) | AppError::Parse(_) => 3,
            AppError::Fetch(_) | AppError::Terminal(_) => 4,
            AppError::Integrity(_) => 5,
        }
    }
}
