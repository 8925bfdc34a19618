//! Output sinks for NDJSON lines.

use async_trait::async_trait;
use hyper::body::{Bytes, Sender};
use std::future::poll_fn;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// The consumer stopped accepting output.
#[derive(Error, Debug)]
#[error("output sink closed: {0}")]
pub struct SinkClosed(pub String);

/// Destination for serialized records, one complete line per write.
///
/// `write_line` may wait for the consumer; that wait is what holds back the decoder.
#[async_trait]
pub trait LineSink: Send {
    async fn write_line(&mut self, line: Vec<u8>) -> Result<(), SinkClosed>;

    /// Ends the output normally.
    async fn close(&mut self) -> Result<(), SinkClosed>;

    /// Ends the output so the consumer can tell it was cut short.
    async fn abort(&mut self);
}

/// Feeds a hyper response body.
pub struct BodySink {
    sender: Option<Sender>,
}

impl BodySink {
    pub fn new(sender: Sender) -> Self {
        Self {
            sender: Some(sender),
        }
    }
}

#[async_trait]
impl LineSink for BodySink {
    async fn write_line(&mut self, line: Vec<u8>) -> Result<(), SinkClosed> {
        let sender = self
            .sender
            .as_mut()
            .ok_or_else(|| SinkClosed("body already finished".to_string()))?;
        sender
            .send_data(Bytes::from(line))
            .await
            .map_err(|e| SinkClosed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SinkClosed> {
        // Dropping the sender ends the body after the data already queued.
        self.sender.take();
        Ok(())
    }

    async fn abort(&mut self) {
        if let Some(mut sender) = self.sender.take() {
            // An aborted body reports the error ahead of queued data, so wait until the
            // last line has been taken. Fails straight away if the body is gone.
            let _ = poll_fn(|cx| sender.poll_ready(cx)).await;
            sender.abort();
        }
    }
}

/// Writes to a file or stdout.
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> LineSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_line(&mut self, line: Vec<u8>) -> Result<(), SinkClosed> {
        self.writer
            .write_all(&line)
            .await
            .map_err(|e| SinkClosed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SinkClosed> {
        self.writer
            .flush()
            .await
            .map_err(|e| SinkClosed(e.to_string()))
    }

    async fn abort(&mut self) {
        // Whole lines only ever reach the writer, so keeping them is safe.
        let _ = self.writer.flush().await;
    }
}
