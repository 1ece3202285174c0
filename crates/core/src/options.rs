//! Per-request options

use std::collections::BTreeMap;

use crate::headers::Headers;

/// Additional headers and query parameters for a single request.
///
/// Operations never modify the options they are given: every call works on
/// its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Headers,
    pub values: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Copy `opts` (if given) and overlay `extra` headers on the copy
    pub(crate) fn cloned(opts: Option<&RequestOptions>, extra: Option<&Headers>) -> Self {
        let mut result = opts.cloned().unwrap_or_default();
        if let Some(extra) = extra {
            result.headers.extend_from(extra);
        }
        result
    }
}
