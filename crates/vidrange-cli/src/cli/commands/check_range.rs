//! `vidrange check-range` – resolve a Range header against a size.

use vidrange_core::range::{parse_range, RangeRequest};

/// Status line and headers the server would send for `header` on an object of `size` bytes.
pub fn describe_range(header: &str, size: u64) -> String {
    match parse_range(Some(header), size) {
        Ok(RangeRequest::Partial(r)) => format!(
            "206 Partial Content\nContent-Range: {}\nContent-Length: {}",
            r.content_range(size),
            r.len()
        ),
        Ok(RangeRequest::Full) => format!("200 OK\nContent-Length: {}", size),
        Err(e) => format!(
            "416 Range Not Satisfiable\nContent-Range: {}\n{}",
            e.content_range(),
            e
        ),
    }
}

pub fn run_check_range(header: &str, size: u64) {
    println!("{}", describe_range(header, size));
}
