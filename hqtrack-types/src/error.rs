//! Data model errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown working mode: {0:?}")]
    UnknownWorkingMode(String),

    #[error("Unknown fix validity: {0:?}")]
    UnknownFixValidity(String),

    /// Reports need a non-zero period
    #[error("Upload interval must be at least 1s, got {0}")]
    InvalidUploadInterval(u32),
}
