//! Error type for unsatisfiable ranges.

use std::fmt;

/// Which bound of the requested range failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeErrorReason {
    /// Start is missing, not a number, negative, or past the end of the object.
    InvalidStart,
    /// End is not a number, past the end of the object, or before start.
    InvalidEnd,
}

/// A `Range` header that cannot be satisfied for an object of `size` bytes.
///
/// Carries the bounds as the client sent them (`None` when a bound was not a
/// number) so the 416 body can name the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    pub requested_start: Option<i64>,
    pub requested_end: Option<i64>,
    pub size: u64,
    pub reason: RangeErrorReason,
}

impl RangeError {
    /// `Content-Range` value for a 416 response: `bytes */size`.
    pub fn content_range(&self) -> String {
        format!("bytes */{}", self.size)
    }
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: Option<i64>) -> fmt::Result {
    match bound {
        Some(n) => write!(f, "{}", n),
        None => write!(f, "not a number"),
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            RangeErrorReason::InvalidStart => {
                write!(f, "invalid range start: ")?;
                write_bound(f, self.requested_start)?;
            }
            RangeErrorReason::InvalidEnd => {
                write!(f, "invalid range end: ")?;
                write_bound(f, self.requested_end)?;
            }
        }
        write!(f, " (object size {})", self.size)
    }
}

impl std::error::Error for RangeError {}
