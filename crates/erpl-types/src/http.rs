// SPDX-License-Identifier: MIT OR Apache-2.0
//! Case-insensitive HTTP header multimap and the plain `HttpResponse` value
//! type shared by the session kernel, the XML codec, and the lock kernel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A case-insensitive, multi-valued header map. Keys are stored
/// lower-cased; lookups lower-case the query key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CiHeaders {
    inner: BTreeMap<String, Vec<String>>,
}

impl CiHeaders {
    /// Construct an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header value (does not replace existing values for the same name).
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.inner
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Replace all values for `name` with a single value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.inner.insert(name.to_ascii_lowercase(), vec![value.into()]);
    }

    /// The first value for `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// All values for `name`, case-insensitively.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all (lower-cased name, value) pairs, name-sorted for determinism.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// True if no headers are present.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A plain HTTP response: status code, case-insensitive headers, and a body.
///
/// This is the only shape the session kernel hands to callers; it performs
/// no interpretation of the body itself (that is the XML codec's job).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: CiHeaders,
    /// Raw response body, already decoded to UTF-8 text where possible.
    pub body: String,
}

impl HttpResponse {
    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let mut h = CiHeaders::new();
        h.append("Set-Cookie", "a=1");
        h.append("set-cookie", "b=2");
        assert_eq!(h.get_all("SET-COOKIE").len(), 2);
        assert_eq!(h.get("sap-contextid"), None);
    }

    #[test]
    fn set_replaces_all_values() {
        let mut h = CiHeaders::new();
        h.append("X-Token", "old");
        h.set("x-token", "new");
        assert_eq!(h.get_all("x-token"), ["new".to_string()]);
    }
}
