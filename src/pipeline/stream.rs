//! The streaming enrichment pipeline: rows in, NDJSON lines out, one row at a time.

use thiserror::Error;
use tokio::io::AsyncRead;
use tracing::{debug, error, info, warn};

use super::sink::{LineSink, SinkClosed};
use super::source::RowStream;
use crate::error::ParcelError;
use crate::metrics::{self, MetricName};
use crate::parcel::{EnrichedRecord, RowDiagnostic, RowTransformer, Transformed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Streaming,
    Completed,
    Failed,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub rows_emitted: u64,
    pub diagnostics: u64,
    pub state: PipelineState,
}

/// Why a run ended in `Failed`.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("source failed after {rows_emitted} rows: {source}")]
    Source {
        rows_emitted: u64,
        #[source]
        source: ParcelError,
    },

    #[error("consumer went away after {rows_emitted} rows: {source}")]
    Disconnected {
        rows_emitted: u64,
        #[source]
        source: SinkClosed,
    },
}

/// Drives one dataset's rows through the transformer into a sink.
///
/// A row is decoded only after the previous line has been accepted by the sink, so the
/// sink's pace bounds the decoder. Row-level problems never end the run; a source error
/// aborts the sink and a sink error stops reading.
pub struct StreamingPipeline {
    dataset: String,
    transformer: RowTransformer,
    state: PipelineState,
    rows_emitted: u64,
    diagnostics: u64,
}

impl StreamingPipeline {
    pub fn new(dataset: impl Into<String>, transformer: RowTransformer) -> Self {
        Self {
            dataset: dataset.into(),
            transformer,
            state: PipelineState::Idle,
            rows_emitted: 0,
            diagnostics: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub async fn run<R, S>(
        &mut self,
        mut rows: RowStream<R>,
        sink: &mut S,
    ) -> Result<PipelineSummary, StreamError>
    where
        R: AsyncRead + Unpin + Send,
        S: LineSink + ?Sized,
    {
        self.state = PipelineState::Streaming;
        debug!(dataset = %self.dataset, "Streaming started");

        loop {
            let row = match rows.next().await {
                None => break,
                Some(Ok(row)) => row,
                Some(Err(source)) => return Err(self.failed(source, sink).await),
            };

            let Transformed {
                record,
                diagnostics,
            } = self.transformer.transform(&row);
            drop(row);
            self.report(&diagnostics);

            let line = match encode(&record) {
                Ok(line) => line,
                Err(source) => return Err(self.failed(source, sink).await),
            };
            if let Err(closed) = sink.write_line(line).await {
                return Err(self.disconnected(closed));
            }
            self.rows_emitted += 1;
            metrics::increment(MetricName::RowsEnriched, 1);
        }

        if let Err(closed) = sink.close().await {
            return Err(self.disconnected(closed));
        }
        self.state = PipelineState::Completed;
        metrics::increment(MetricName::StreamsCompleted, 1);
        info!(
            dataset = %self.dataset,
            rows = self.rows_emitted,
            diagnostics = self.diagnostics,
            "Stream completed"
        );

        Ok(PipelineSummary {
            rows_emitted: self.rows_emitted,
            diagnostics: self.diagnostics,
            state: self.state,
        })
    }

    fn report(&mut self, diagnostics: &[RowDiagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        let row = self.rows_emitted + 1;
        for diagnostic in diagnostics {
            if diagnostic.is_config_gap() {
                warn!(dataset = %self.dataset, row, "{}", diagnostic);
            } else {
                debug!(dataset = %self.dataset, row, "{}", diagnostic);
            }
        }
        self.diagnostics += diagnostics.len() as u64;
        metrics::increment(MetricName::RowDiagnostics, diagnostics.len() as u64);
    }

    async fn failed<S>(&mut self, source: ParcelError, sink: &mut S) -> StreamError
    where
        S: LineSink + ?Sized,
    {
        self.state = PipelineState::Failed;
        error!(
            dataset = %self.dataset,
            rows = self.rows_emitted,
            "Stream error: {}", source
        );
        sink.abort().await;
        metrics::increment(MetricName::StreamsFailed, 1);
        StreamError::Source {
            rows_emitted: self.rows_emitted,
            source,
        }
    }

    fn disconnected(&mut self, source: SinkClosed) -> StreamError {
        self.state = PipelineState::Failed;
        metrics::increment(MetricName::StreamsFailed, 1);
        info!(
            dataset = %self.dataset,
            rows = self.rows_emitted,
            "Consumer disconnected, stopping stream: {}", source
        );
        StreamError::Disconnected {
            rows_emitted: self.rows_emitted,
            source,
        }
    }
}

/// One NDJSON line, newline included.
fn encode(record: &EnrichedRecord) -> Result<Vec<u8>, ParcelError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(line)
}
