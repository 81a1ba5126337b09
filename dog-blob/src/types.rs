use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use std::pin::Pin;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Inclusive byte range for partial content requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn inclusive(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self, total_size: u64) -> bool {
        self.start <= self.end && self.end < total_size
    }
}

/// Narrow a full-object stream down to `len` bytes starting at `start`.
///
/// Used when a store cannot serve ranges itself. Chunks before `start` are
/// discarded as they arrive and the inner stream is dropped as soon as the
/// window is filled, so the object is never buffered as a whole.
pub fn slice_stream(mut inner: ByteStream, start: u64, len: u64) -> ByteStream {
    let stream = async_stream::stream! {
        let mut skip = start;
        let mut remaining = len;

        while remaining > 0 {
            match inner.next().await {
                Some(Ok(mut chunk)) => {
                    let chunk_len = chunk.len() as u64;
                    if skip >= chunk_len {
                        skip -= chunk_len;
                        continue;
                    }
                    if skip > 0 {
                        chunk = chunk.slice(skip as usize..);
                        skip = 0;
                    }
                    if chunk.len() as u64 > remaining {
                        chunk.truncate(remaining as usize);
                    }
                    remaining -= chunk.len() as u64;
                    yield Ok(chunk);
                }
                Some(Err(e)) => {
                    yield Err(e);
                    return;
                }
                None => {
                    yield Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("stream ended with {} bytes of the range unread", remaining),
                    ));
                    return;
                }
            }
        }
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunked(parts: &[&'static str]) -> ByteStream {
        let chunks: Vec<Result<Bytes, std::io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        Box::pin(stream::iter(chunks))
    }

    async fn collect(stream: ByteStream) -> Result<Vec<u8>, std::io::Error> {
        let mut out = Vec::new();
        let mut stream = stream;
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[test]
    fn byte_range_validity() {
        assert!(ByteRange::inclusive(2, 4).is_valid(7));
        assert!(ByteRange::inclusive(6, 6).is_valid(7));
        assert!(!ByteRange::inclusive(5, 7).is_valid(7));
        assert!(!ByteRange::inclusive(5, 3).is_valid(7));
        assert!(!ByteRange::inclusive(0, 0).is_valid(0));
    }

    #[tokio::test]
    async fn slice_spans_chunk_boundaries() {
        let sliced = slice_stream(chunked(&["con", "ten", "t"]), 2, 3);
        assert_eq!(collect(sliced).await.unwrap(), b"nte");
    }

    #[tokio::test]
    async fn slice_stops_reading_once_filled() {
        let sliced = slice_stream(chunked(&["abc", "def"]), 0, 2);
        assert_eq!(collect(sliced).await.unwrap(), b"ab");
    }

    #[tokio::test]
    async fn slice_reports_short_source() {
        let sliced = slice_stream(chunked(&["abc"]), 1, 5);
        let err = collect(sliced).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
