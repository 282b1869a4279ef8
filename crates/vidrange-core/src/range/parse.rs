//! Parse a `Range` header value against an object size.

use super::{ByteRange, RangeError, RangeErrorReason, RangeRequest};

const BYTES_UNIT: &str = "bytes=";

/// Parses `header` (the raw `Range` value, if any) for an object of `size` bytes.
///
/// `bytes=start-end` yields an inclusive window; `bytes=start-` runs to the last
/// byte. Fields after the first `-`-separated pair are ignored, so for
/// `bytes=0-99,200-299` only `0-99` is honored. Bounds are read as a leading
/// decimal integer; trailing text after the digits is ignored.
///
/// An absent or blank header means the whole object. Validation runs start
/// first, then end. Nothing here touches the object body.
pub fn parse_range(header: Option<&str>, size: u64) -> Result<RangeRequest, RangeError> {
    let Some(raw) = header.filter(|h| !h.trim().is_empty()) else {
        return Ok(RangeRequest::Full);
    };

    let ranges = strip_unit(raw.trim());
    let mut fields = ranges.split('-');
    let start = fields.next().and_then(parse_leading_int);
    let end = match fields.next() {
        Some(field) if !field.is_empty() => parse_leading_int(field),
        _ => Some(last_offset(size)),
    };

    let fail = move |reason| RangeError {
        requested_start: start,
        requested_end: end,
        size,
        reason,
    };

    let size = i128::from(size);
    let start = match start {
        Some(s) if s >= 0 && i128::from(s) < size => s,
        _ => return Err(fail(RangeErrorReason::InvalidStart)),
    };
    let end = match end {
        Some(e) if i128::from(e) < size && e >= start => e,
        _ => return Err(fail(RangeErrorReason::InvalidEnd)),
    };

    Ok(RangeRequest::Partial(ByteRange {
        start: start as u64,
        end: end as u64,
    }))
}

/// Last valid offset as a signed value (`-1` for an empty object).
fn last_offset(size: u64) -> i64 {
    i64::try_from(size).map(|s| s - 1).unwrap_or(i64::MAX)
}

fn strip_unit(value: &str) -> &str {
    match value.get(..BYTES_UNIT.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BYTES_UNIT) => &value[BYTES_UNIT.len()..],
        _ => value,
    }
}

/// Reads an optionally signed decimal integer prefix. Returns `None` when no
/// digit follows the optional sign. Values too large for `i64` saturate.
fn parse_leading_int(field: &str) -> Option<i64> {
    let s = field.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}
