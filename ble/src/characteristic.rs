use async_trait::async_trait;
use std::io::{self, ErrorKind};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Characteristic write failed: {0}")]
    Io(#[from] io::Error),

    #[error("Device disconnected")]
    Disconnected,
}

/// The writable side of a GATT characteristic.
///
/// A single call maps onto a single write without response, so callers are responsible for
/// keeping `data` within the negotiated payload size.
#[async_trait]
pub trait Characteristic: Send {
    async fn write_value(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

/// Treats any async byte sink as a characteristic, flushing after every write so each chunk
/// leaves as its own packet.
pub struct StreamCharacteristic<W> {
    writer: W,
}

impl<W> StreamCharacteristic<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> Characteristic for StreamCharacteristic<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_value(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data).await.map_err(classify)?;
        self.writer.flush().await.map_err(classify)?;
        Ok(())
    }
}

fn classify(error: io::Error) -> TransportError {
    match error.kind() {
        ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected => TransportError::Disconnected,
        _ => TransportError::Io(error),
    }
}
