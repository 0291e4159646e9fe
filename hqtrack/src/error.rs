//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] hqtrack_core::Error),
    
    #[error("Transport error: {0}")]
    Transport(#[from] hqtrack_transport::Error),
    
    #[error("Type error: {0}")]
    Types(#[from] hqtrack_types::Error),
    
    #[error("Device not connected")]
    NotConnected,
    
    #[error("Simulator already started (sessions cannot be restarted)")]
    AlreadyRunning,
}
