pub mod sink;
pub mod source;
pub mod stream;

pub use sink::{BodySink, LineSink, SinkClosed, WriterSink};
pub use source::RowStream;
pub use stream::{PipelineState, PipelineSummary, StreamError, StreamingPipeline};
