//! Error types for hqtrack-core

/// Result type alias for hqtrack-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame lacks its sentinels or has too few fields
    #[error("Malformed frame: {reason}")]
    MalformedFrame {
        reason: String,
    },

    /// A handler needed a field the command does not carry
    #[error("Command {code} is missing field {index}")]
    MissingField {
        code: String,
        index: usize,
    },

    /// A field is present but has the wrong shape
    #[error("Command {code} field {index} is invalid ({value:?}): {reason}")]
    InvalidField {
        code: String,
        index: usize,
        value: String,
        reason: String,
    },

    /// Command code not in the dialect's handler table
    #[error("Unknown command code: {0}")]
    UnknownCommand(String),

    /// Coordinate cannot be encoded
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(f64),

    /// Dialect name not recognized
    #[error("Unknown dialect: {0:?}")]
    UnknownDialect(String),

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Data model validation failed
    #[error("Type error: {0}")]
    Types(#[from] hqtrack_types::Error),
}

impl Error {
    /// Check if this error came from a handler rejecting a command's fields
    pub fn is_handler_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::Types(_)
        )
    }
}
