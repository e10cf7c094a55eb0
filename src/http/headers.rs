//! Ordered header storage shared by [`HttpRequest`](crate::http::request::HttpRequest)
//! and [`HttpResponse`](crate::http::response::HttpResponse).
//!
//! Insertion order is preserved and is the order headers go out on the wire.
//! [`HttpHeaders::get`] ignores ASCII case in names; [`HttpHeaders::get_exact`]
//! does not, which is what the `Host` check relies on. Values are stored and
//! compared verbatim.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct HttpHeaders {
    headers: IndexMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Inserts or replaces a header. Replacing keeps the original position.
    pub fn set_raw(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(idx) => {
                if let Some((_, slot)) = self.headers.get_index_mut(idx) {
                    *slot = value.to_string();
                }
            }
            None => {
                self.headers.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.headers.get_index(idx))
            .map(|(_, value)| value.as_str())
    }

    /// Looks a header up by its name exactly as it appeared on the wire.
    pub fn get_exact(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// `Name: value\r\n` for each header, in insertion order.
    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in &self.headers {
            result.push_str(name);
            result.push_str(": ");
            result.push_str(value);
            result.push_str("\r\n");
        }
        result
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name))
    }
}
