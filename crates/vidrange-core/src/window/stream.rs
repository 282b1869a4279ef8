//! `Stream` adapter that emits only the bytes of one window.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::RangeWindow;
use crate::range::ByteRange;

/// Wraps an upstream byte stream and yields exactly the bytes of `range`.
///
/// Upstream is pulled only when this stream is polled. It is dropped as soon
/// as the window is complete, on the first upstream error, or when this
/// stream is dropped (e.g. the client disconnects).
pub struct RangedStream<S> {
    upstream: Option<S>,
    window: RangeWindow,
}

impl<S> RangedStream<S> {
    pub fn new(upstream: S, range: ByteRange) -> Self {
        Self {
            upstream: Some(upstream),
            window: RangeWindow::new(range),
        }
    }

    /// Upstream bytes consumed so far.
    pub fn bytes_seen(&self) -> u64 {
        self.window.bytes_seen()
    }

    /// True while the upstream stream is still held.
    pub fn is_upstream_open(&self) -> bool {
        self.upstream.is_some()
    }
}

impl<S> Stream for RangedStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(upstream) = this.upstream.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(upstream.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    let slice = this.window.feed(chunk);
                    if this.window.is_done() {
                        tracing::trace!(bytes_seen = this.window.bytes_seen(), "range window complete");
                        this.upstream = None;
                    }
                    if let Some(slice) = slice {
                        return Poll::Ready(Some(Ok(slice)));
                    }
                }
                Some(Err(e)) => {
                    this.upstream = None;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.upstream = None;
                    if this.window.is_done() {
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "upstream ended after {} bytes, before range end",
                            this.window.bytes_seen()
                        ),
                    ))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Upstream that records when it is dropped.
    struct DropFlag<S> {
        inner: S,
        dropped: Arc<AtomicBool>,
    }

    impl<S: Stream + Unpin> Stream for DropFlag<S> {
        type Item = S::Item;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
            self.inner.poll_next_unpin(cx)
        }
    }

    impl<S> Drop for DropFlag<S> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    type Chunks = stream::Iter<std::vec::IntoIter<io::Result<Bytes>>>;

    fn flagged(data: &[u8], chunk: usize) -> (DropFlag<Chunks>, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let upstream = DropFlag {
            inner: stream::iter(chunked(data, chunk)),
            dropped: Arc::clone(&dropped),
        };
        (upstream, dropped)
    }

    fn chunked(data: &[u8], chunk: usize) -> Vec<io::Result<Bytes>> {
        data.chunks(chunk)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect()
    }

    async fn collect<S>(s: RangedStream<S>) -> io::Result<Vec<u8>>
    where
        S: Stream<Item = io::Result<Bytes>> + Unpin,
    {
        let parts: Vec<Bytes> = s.try_collect().await?;
        Ok(parts.concat())
    }

    #[tokio::test]
    async fn emits_exact_window_for_every_chunking() {
        let data: Vec<u8> = (0u8..=255).cycle().take(37).collect();
        let size = data.len() as u64;
        for chunk in 1..=9 {
            for start in 0..size {
                for end in start..size {
                    let upstream = stream::iter(chunked(&data, chunk));
                    let out = collect(RangedStream::new(upstream, ByteRange { start, end }))
                        .await
                        .unwrap();
                    assert_eq!(
                        out,
                        &data[start as usize..=end as usize],
                        "chunk={chunk} start={start} end={end}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn stops_pulling_once_window_is_done() {
        let data: Vec<u8> = (0u8..100).collect();
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let upstream = stream::iter(chunked(&data, 10)).inspect(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        let mut s = RangedStream::new(upstream, ByteRange { start: 5, end: 24 });

        let mut out = Vec::new();
        while let Some(part) = s.next().await {
            out.extend_from_slice(&part.unwrap());
        }
        assert_eq!(out, &data[5..25]);
        assert_eq!(pulled.load(Ordering::Relaxed), 3);
        assert!(!s.is_upstream_open());
        assert_eq!(s.bytes_seen(), 30);
    }

    #[tokio::test]
    async fn upstream_released_when_window_completes() {
        let data: Vec<u8> = (0u8..100).collect();
        let (upstream, dropped) = flagged(&data, 10);
        let mut s = RangedStream::new(upstream, ByteRange { start: 0, end: 14 });

        assert_eq!(&s.next().await.unwrap().unwrap()[..], &data[..10]);
        assert!(!dropped.load(Ordering::SeqCst));
        assert_eq!(&s.next().await.unwrap().unwrap()[..], &data[10..15]);
        assert!(dropped.load(Ordering::SeqCst));
        assert!(!s.is_upstream_open());
    }

    #[tokio::test]
    async fn dropping_mid_window_releases_upstream() {
        let data: Vec<u8> = (0u8..100).collect();
        let (upstream, dropped) = flagged(&data, 10);
        let mut s = RangedStream::new(upstream, ByteRange { start: 5, end: 94 });

        assert_eq!(&s.next().await.unwrap().unwrap()[..], &data[5..10]);
        assert!(!dropped.load(Ordering::SeqCst));
        drop(s);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn upstream_error_is_forwarded_then_ends() {
        let upstream = stream::iter(vec![
            Ok(Bytes::from_static(b"abcd")),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
            Ok(Bytes::from_static(b"efgh")),
        ]);
        let mut s = RangedStream::new(upstream, ByteRange { start: 2, end: 6 });
        assert_eq!(&s.next().await.unwrap().unwrap()[..], b"cd");
        let err = s.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn short_upstream_reports_unexpected_eof() {
        let upstream = stream::iter(vec![Ok(Bytes::from_static(b"abc"))]);
        let mut s = RangedStream::new(upstream, ByteRange { start: 1, end: 9 });
        assert_eq!(&s.next().await.unwrap().unwrap()[..], b"bc");
        let err = s.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn same_window_twice_is_identical() {
        let data: Vec<u8> = (0u8..200).collect();
        let range = ByteRange { start: 17, end: 140 };
        let a = collect(RangedStream::new(stream::iter(chunked(&data, 13)), range))
            .await
            .unwrap();
        let b = collect(RangedStream::new(stream::iter(chunked(&data, 13)), range))
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
