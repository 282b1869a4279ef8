//! Range header parsing and byte-window math.
//!
//! Resolves a single `Range: bytes=start-[end]` value against an object size
//! into either a full-object request or a validated inclusive window. Only the
//! leading range of a multi-range header is honored.

mod error;
mod parse;

pub use error::{RangeError, RangeErrorReason};
pub use parse::parse_range;

/// An inclusive byte window `[start, end]` inside an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by this window.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response: `bytes start-end/size`.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Outcome of parsing a request's `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No `Range` header: serve the whole object.
    Full,
    /// A validated window to serve with 206.
    Partial(ByteRange),
}
