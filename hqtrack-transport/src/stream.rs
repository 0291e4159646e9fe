//! Read/write halves over any tokio byte stream

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use crate::{error::*, TransportReader, TransportWriter};

/// Receive buffer size per read
const READ_CHUNK: usize = 1024;

/// Longest a single send may block on a peer that is not reading
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Reading half backed by an [`AsyncRead`]
pub struct StreamReader<R> {
    inner: R,
}

impl<R> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R> TransportReader for StreamReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn receive(&mut self, timeout_duration: Duration) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);

        let n = timeout(timeout_duration, self.inner.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;

        if n == 0 {
            return Err(Error::ConnectionClosed);
        }

        trace!("Received {} bytes: {:?}", n, String::from_utf8_lossy(&buf));

        Ok(buf)
    }
}

/// Writing half backed by an [`AsyncWrite`]
///
/// Every send and shutdown is bounded by the write timeout.
pub struct StreamWriter<W> {
    inner: W,
    write_timeout: Duration,
}

impl<W> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Set write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

#[async_trait]
impl<W> TransportWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        trace!("Sending {} bytes", data.len());

        let inner = &mut self.inner;
        timeout(self.write_timeout, async move {
            inner.write_all(data).await?;
            inner.flush().await
        })
        .await
        .map_err(|_| Error::WriteTimeout)??;

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        timeout(self.write_timeout, self.inner.shutdown())
            .await
            .map_err(|_| Error::WriteTimeout)??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_send_and_receive() {
        let (a, b) = duplex(64);
        let mut writer = StreamWriter::new(a);
        let mut reader = StreamReader::new(b);

        writer.send(b"*HQ,1,V0#").await.unwrap();
        let buf = reader.receive(Duration::from_secs(1)).await.unwrap();

        assert_eq!(&buf[..], b"*HQ,1,V0#");
    }

    #[tokio::test(start_paused = true)]
    async fn test_receive_timeout() {
        let (_a, b) = duplex(64);
        let mut reader = StreamReader::new(b);

        let result = reader.receive(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::ReadTimeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_times_out_when_peer_stalls() {
        let (a, _b) = duplex(8);
        let mut writer = StreamWriter::new(a).with_write_timeout(Duration::from_millis(100));

        let result = writer.send(b"*HQ,8168000005,R12#").await;
        assert!(matches!(result, Err(Error::WriteTimeout)));
    }

    #[tokio::test]
    async fn test_receive_after_close() {
        let (a, b) = duplex(64);
        let mut writer = StreamWriter::new(a);
        let mut reader = StreamReader::new(b);

        writer.shutdown().await.unwrap();
        drop(writer);

        let result = reader.receive(Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }
}
