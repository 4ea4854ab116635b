use thiserror::Error;
use tickvault_core::ValidationError;
use tickvault_store::{QueryError, StorageError};

/// Top-level CLI error. Every failure surfaces here so `main` can print
/// one line and map it to a process exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no data found for symbol '{symbol}' between {start_date} and {end_date}")]
    NotFound {
        symbol: String,
        start_date: String,
        end_date: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Maps the error to a process exit code.
    ///
    /// | Code | Meaning |
    /// |------|---------|
    /// | 2 | Invalid input or configuration |
    /// | 3 | No data for the requested range |
    /// | 4 | Output serialization failure |
    /// | 10 | Storage or I/O failure |
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::NotFound { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Storage(_) | Self::Io(_) => 10,
        }
    }
}

impl From<QueryError> for CliError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Validation(error) => Self::Validation(error),
            QueryError::NotFound {
                symbol,
                start_date,
                end_date,
            } => Self::NotFound {
                symbol,
                start_date,
                end_date,
            },
            QueryError::Storage(error) => Self::Storage(error),
        }
    }
}
