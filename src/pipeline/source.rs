//! Row source: decodes CSV rows on demand from an async byte stream.

use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord, Trim};
use tokio::io::AsyncRead;

use crate::error::{ParcelError, Result};
use crate::parcel::row::{HeaderIndex, RawRow};

/// Decodes one row per call from any async byte source.
///
/// Nothing is read until a row is asked for, and only as much input as that row needs
/// (plus the decoder's buffer) is pulled. Rows may be shorter or longer than the
/// header. Headers and values are trimmed. The first decode error ends the stream.
pub struct RowStream<R> {
    reader: AsyncReader<R>,
    index: Option<HeaderIndex>,
    peeked: Option<Result<RawRow>>,
    done: bool,
}

impl<R> RowStream<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(source: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .create_reader(source);
        Self {
            reader,
            index: None,
            peeked: None,
            done: false,
        }
    }

    /// Next row, or None at end of input.
    pub async fn next(&mut self) -> Option<Result<RawRow>> {
        match self.peeked.take() {
            Some(item) => Some(item),
            None => self.read_row().await,
        }
    }

    /// Looks at the next row without consuming it.
    pub async fn peek(&mut self) -> Option<&Result<RawRow>> {
        if self.peeked.is_none() {
            self.peeked = self.read_row().await;
        }
        self.peeked.as_ref()
    }

    async fn header_index(&mut self) -> Result<HeaderIndex> {
        if let Some(index) = &self.index {
            return Ok(index.clone());
        }
        let headers = self.reader.headers().await.map_err(ParcelError::decode)?;
        let index = RawRow::index_headers(headers);
        self.index = Some(index.clone());
        Ok(index)
    }

    async fn read_row(&mut self) -> Option<Result<RawRow>> {
        if self.done {
            return None;
        }
        let index = match self.header_index().await {
            Ok(index) => index,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record).await {
            Ok(true) => Some(Ok(RawRow::new(index, record))),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(ParcelError::decode(e)))
            }
        }
    }
}

/// Byte sources that let tests see how far the decoder has read.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    /// Hands out one input line per read and counts the lines served.
    pub(crate) struct LineByLine {
        lines: VecDeque<Vec<u8>>,
        served: Arc<AtomicUsize>,
    }

    impl LineByLine {
        pub(crate) fn new<I, S>(lines: I) -> (Self, Arc<AtomicUsize>)
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            let served = Arc::new(AtomicUsize::new(0));
            let lines = lines
                .into_iter()
                .map(|line| format!("{}\n", line.as_ref()).into_bytes())
                .collect();
            (
                Self {
                    lines,
                    served: served.clone(),
                },
                served,
            )
        }
    }

    impl AsyncRead for LineByLine {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            if let Some(line) = this.lines.pop_front() {
                buf.put_slice(&line);
                this.served.fetch_add(1, Ordering::SeqCst);
            }
            Poll::Ready(Ok(()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::LineByLine;
    use super::*;
    use std::sync::atomic::Ordering;

    async fn collect<R>(mut stream: RowStream<R>) -> Vec<Result<RawRow>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_decodes_rows_by_header() {
        let csv = "Tax Parcel ID, Owner Name \n 1 ,Acme LLC\n2,\"Doe, Jane\"\n";
        let rows: Vec<RawRow> = collect(RowStream::new(csv.as_bytes()))
            .await
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("Tax Parcel ID"), Some("1"));
        assert_eq!(rows[0].value("Owner Name"), Some("Acme LLC"));
        assert_eq!(rows[1].value("Owner Name"), Some("Doe, Jane"));
    }

    #[tokio::test]
    async fn test_accepts_ragged_rows() {
        let rows: Vec<RawRow> = collect(RowStream::new(&b"a,b,c\n1\n1,2,3,4\n"[..]))
            .await
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("b"), None);
        assert_eq!(rows[1].value("c"), Some("3"));
    }

    #[tokio::test]
    async fn test_header_only_yields_nothing() {
        assert!(collect(RowStream::new(&b"a,b\n"[..])).await.is_empty());
        assert!(collect(RowStream::new(&b""[..])).await.is_empty());
    }

    #[tokio::test]
    async fn test_stops_after_invalid_utf8() {
        let mut bytes = b"a,b\n1,2\n3,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\n5,6\n");

        let items = collect(RowStream::new(bytes.as_slice())).await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(ParcelError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_peek_then_next() {
        let mut stream = RowStream::new(&b"a\n1\n2\n"[..]);

        let first = stream.peek().await.unwrap().as_ref().unwrap();
        assert_eq!(first.value("a"), Some("1"));
        assert_eq!(stream.next().await.unwrap().unwrap().value("a"), Some("1"));
        assert_eq!(stream.next().await.unwrap().unwrap().value("a"), Some("2"));
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_reads_only_what_is_asked_for() {
        let lines = std::iter::once("a".to_string()).chain((0..100).map(|i| i.to_string()));
        let (source, served) = LineByLine::new(lines);
        let mut stream = RowStream::new(source);
        assert_eq!(served.load(Ordering::SeqCst), 0);

        // header plus the first row
        assert!(stream.peek().await.unwrap().is_ok());
        assert!(served.load(Ordering::SeqCst) <= 2);

        assert_eq!(stream.next().await.unwrap().unwrap().value("a"), Some("0"));
        assert!(served.load(Ordering::SeqCst) <= 2);

        assert_eq!(stream.next().await.unwrap().unwrap().value("a"), Some("1"));
        assert!(served.load(Ordering::SeqCst) <= 3);
    }
}
