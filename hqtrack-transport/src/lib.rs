//! Transport layer for HQ protocol devices
//!
//! A device session holds one long-lived byte stream. It is connected once,
//! then split so the inbound loop can block on reads while the outbound loop
//! writes.

pub mod duplex;
pub mod error;
pub mod stream;
pub mod tcp;

pub use duplex::DuplexTransport;
pub use error::{Error, Result};
pub use stream::{StreamReader, StreamWriter, DEFAULT_WRITE_TIMEOUT};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different connection types
#[async_trait]
pub trait Transport: Send {
    /// Connect to the server
    async fn connect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Get remote address
    fn remote_addr(&self) -> String;

    /// Split a connected transport into independent read and write halves
    fn into_split(self: Box<Self>)
    -> Result<(Box<dyn TransportReader>, Box<dyn TransportWriter>)>;
}

/// Receiving half of a split transport
#[async_trait]
pub trait TransportReader: Send {
    /// Receive whatever bytes are available, waiting at most `timeout`
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;
}

/// Sending half of a split transport
#[async_trait]
pub trait TransportWriter: Send {
    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Close the write side
    async fn shutdown(&mut self) -> Result<()>;
}
