//! CORS origin reflection and `Vary` merging.

use std::collections::HashSet;

use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, VARY};
use axum::http::{HeaderMap, HeaderValue};

/// Fixed set of origins that get `Access-Control-Allow-Origin` echoed back.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed: HashSet<String>,
}

impl CorsPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership check.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.contains(origin)
    }

    /// Reflects `origin` when allowed and always adds `Origin` to `Vary`.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Some(origin) = origin.filter(|o| self.is_allowed(o)) {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
        }
        merge_vary(headers, "Origin");
    }
}

/// Adds `token` to the `Vary` header unless already listed (case-insensitive).
///
/// All existing `Vary` lines are folded into one comma-separated value with
/// duplicates removed.
pub fn merge_vary(headers: &mut HeaderMap, token: &str) {
    let mut tokens: Vec<String> = Vec::new();
    for value in headers.get_all(VARY) {
        let Ok(value) = value.to_str() else { continue };
        for t in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !tokens.iter().any(|x| x.eq_ignore_ascii_case(t)) {
                tokens.push(t.to_string());
            }
        }
    }
    if !tokens.iter().any(|x| x.eq_ignore_ascii_case(token)) {
        tokens.push(token.to_string());
    }

    match HeaderValue::from_str(&tokens.join(", ")) {
        Ok(value) => {
            headers.insert(VARY, value);
        }
        Err(e) => tracing::warn!("could not merge Vary header: {}", e),
    }
}
