//! Sub-range streaming.
//!
//! Re-slices an upstream byte stream of arbitrary, backend-chosen chunk sizes
//! so that only the bytes of one validated window are emitted. The counter of
//! upstream bytes lives in a per-stream [`RangeWindow`], never in shared state.

mod stream;

pub use stream::RangedStream;

use bytes::Bytes;

use crate::range::ByteRange;

/// Slicing state for one range over one upstream pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    start: u64,
    end: u64,
    bytes_seen: u64,
}

impl RangeWindow {
    pub fn new(range: ByteRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            bytes_seen: 0,
        }
    }

    /// Upstream bytes consumed so far, across all chunks.
    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }

    /// True once the last byte of the window has been consumed.
    pub fn is_done(&self) -> bool {
        self.bytes_seen > self.end
    }

    /// Consumes one upstream chunk and returns the part of it inside the window.
    ///
    /// Chunks entirely before the window are discarded. The returned slice
    /// shares the chunk's buffer.
    pub fn feed(&mut self, chunk: Bytes) -> Option<Bytes> {
        if self.is_done() {
            return None;
        }
        let len = chunk.len() as u64;
        let local_start = self.start.saturating_sub(self.bytes_seen);
        let local_end = len.min((self.end + 1).saturating_sub(self.bytes_seen));
        self.bytes_seen += len;

        if local_start < local_end {
            Some(chunk.slice(local_start as usize..local_end as usize))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: u64, end: u64) -> RangeWindow {
        RangeWindow::new(ByteRange { start, end })
    }

    #[test]
    fn chunk_before_window_is_discarded() {
        let mut w = window(10, 19);
        assert_eq!(w.feed(Bytes::from_static(&[0u8; 10])), None);
        assert_eq!(w.bytes_seen(), 10);
        assert!(!w.is_done());
    }

    #[test]
    fn window_inside_single_chunk() {
        let data: Vec<u8> = (0u8..50).collect();
        let mut w = window(10, 19);
        let out = w.feed(Bytes::from(data)).unwrap();
        assert_eq!(&out[..], &(10u8..20).collect::<Vec<_>>()[..]);
        assert!(w.is_done());
    }

    #[test]
    fn window_spanning_chunks() {
        let mut w = window(3, 8);
        let a = w.feed(Bytes::from_static(b"abcde")).unwrap();
        assert_eq!(&a[..], b"de");
        assert!(!w.is_done());
        let b = w.feed(Bytes::from_static(b"fghij")).unwrap();
        assert_eq!(&b[..], b"fghi");
        assert!(w.is_done());
    }

    #[test]
    fn chunk_ending_exactly_at_window_end() {
        let mut w = window(0, 4);
        let out = w.feed(Bytes::from_static(b"abcde")).unwrap();
        assert_eq!(&out[..], b"abcde");
        assert_eq!(w.bytes_seen(), 5);
        assert!(w.is_done());
    }

    #[test]
    fn empty_chunk_changes_nothing() {
        let mut w = window(2, 3);
        assert_eq!(w.feed(Bytes::new()), None);
        assert_eq!(w.bytes_seen(), 0);
    }

    #[test]
    fn feed_after_done_is_ignored() {
        let mut w = window(0, 0);
        assert_eq!(&w.feed(Bytes::from_static(b"xy")).unwrap()[..], b"x");
        assert_eq!(w.feed(Bytes::from_static(b"z")), None);
        assert_eq!(w.bytes_seen(), 2);
    }
}
