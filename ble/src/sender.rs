use std::time::Duration;

use log::debug;
use thiserror::Error;
use tokio::time::sleep;

use crate::characteristic::{Characteristic, TransportError};
use crate::protocol::{chunk_text, CHUNK_DELAY, MAX_CHUNK_SIZE, TERMINATOR};

#[derive(Error, Debug)]
pub enum SendError {
    #[error("No active BLE connection")]
    NoConnection,

    #[error("Failed to write chunk {chunk}: {source}")]
    Transport {
        chunk: usize,
        #[source]
        source: TransportError,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SendReport {
    /// Writes issued, including the terminator.
    pub writes: usize,
    pub bytes: usize,
}

#[derive(Debug, Copy, Clone)]
pub struct ChunkedSender {
    max_chunk_size: usize,
    chunk_delay: Duration,
}

impl Default for ChunkedSender {
    fn default() -> Self {
        Self::new(MAX_CHUNK_SIZE, CHUNK_DELAY)
    }
}

impl ChunkedSender {
    pub fn new(max_chunk_size: usize, chunk_delay: Duration) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
            chunk_delay,
        }
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Writes `text` as consecutive chunks, then the terminator.
    ///
    /// When the text needs more than one chunk, every chunk is followed by a pause so the
    /// device has time to drain its receive buffer. The first failed write aborts the
    /// transmission and nothing further, terminator included, is written.
    pub async fn send<C>(&self, characteristic: &mut C, text: &str) -> Result<SendReport, SendError>
    where
        C: Characteristic + ?Sized,
    {
        let chunks = chunk_text(text, self.max_chunk_size);
        let paced = chunks.len() > 1;
        debug!("Sending {} chunk(s) for {:?}", chunks.len(), text);

        let mut report = SendReport {
            writes: 0,
            bytes: 0,
        };
        for (index, chunk) in chunks.iter().enumerate() {
            self.write(characteristic, chunk.as_bytes(), index, &mut report)
                .await?;
            if paced {
                sleep(self.chunk_delay).await;
            }
        }
        self.write(characteristic, TERMINATOR, chunks.len(), &mut report)
            .await?;

        Ok(report)
    }

    async fn write<C>(
        &self,
        characteristic: &mut C,
        data: &[u8],
        chunk: usize,
        report: &mut SendReport,
    ) -> Result<(), SendError>
    where
        C: Characteristic + ?Sized,
    {
        characteristic
            .write_value(data)
            .await
            .map_err(|source| SendError::Transport { chunk, source })?;
        report.writes += 1;
        report.bytes += data.len();
        Ok(())
    }
}
