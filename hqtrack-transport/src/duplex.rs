//! In-memory transport
//!
//! Connects a simulated device to a peer stream in the same process. Used to
//! drive sessions in tests without opening sockets.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{self, DuplexStream};
use tracing::debug;

use crate::{
    error::*, StreamReader, StreamWriter, Transport, TransportReader, TransportWriter,
    DEFAULT_WRITE_TIMEOUT,
};

/// Transport over one end of a [`tokio::io::duplex`] pipe
pub struct DuplexTransport {
    stream: Option<DuplexStream>,
    connected: bool,
    write_timeout: Duration,
}

impl DuplexTransport {
    /// Create a transport and the server-side end of its pipe
    pub fn pair(max_buf_size: usize) -> (Self, DuplexStream) {
        let (device, server) = io::duplex(max_buf_size);
        (
            Self {
                stream: Some(device),
                connected: false,
                write_timeout: DEFAULT_WRITE_TIMEOUT,
            },
            server,
        )
    }

    /// Set the limit on each send while the peer is not reading
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for DuplexTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }
        if self.stream.is_none() {
            return Err(Error::ConnectionClosed);
        }

        debug!("Connected to in-memory peer");
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected && self.stream.is_some()
    }

    fn remote_addr(&self) -> String {
        "memory".to_string()
    }

    fn into_split(
        mut self: Box<Self>,
    ) -> Result<(Box<dyn TransportReader>, Box<dyn TransportWriter>)> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        let stream = self.stream.take().ok_or(Error::NotConnected)?;
        let (read, write) = io::split(stream);

        Ok((
            Box::new(StreamReader::new(read)),
            Box::new(StreamWriter::new(write).with_write_timeout(self.write_timeout)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_duplex_connect_twice() {
        let (mut transport, _server) = DuplexTransport::pair(256);
        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert!(matches!(transport.connect().await, Err(Error::AlreadyConnected)));
    }

    #[tokio::test]
    async fn test_split_requires_connect() {
        let (transport, _server) = DuplexTransport::pair(256);
        assert!(Box::new(transport).into_split().is_err());
    }

    #[tokio::test]
    async fn test_duplex_round_trip() {
        let (mut transport, mut server) = DuplexTransport::pair(256);
        transport.connect().await.unwrap();
        let (mut reader, mut writer) = Box::new(transport).into_split().unwrap();

        writer.send(b"*HQ,1,V0#").await.unwrap();
        let mut buf = [0u8; 9];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"*HQ,1,V0#");

        server.write_all(b"*HQ,1,R7#").await.unwrap();
        let got = reader.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(&got[..], b"*HQ,1,R7#");
    }
}
