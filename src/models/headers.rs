//! Case-insensitive ordered header map.
//!
//! Media URLs returned by the parsers are only fetchable with the right
//! cookies and referer. This map carries those headers to the delivery
//! layer, preserving insertion order and treating names that differ only
//! in ASCII case as the same entry.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Ordered HTTP header map with case-insensitive names.
///
/// Inserting a name that differs only in case from an existing entry
/// overwrites that entry in place (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, overwriting any entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].1.as_str())
    }

    /// Remove a header by name, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name)
            .map(|index| self.entries.remove(index).1)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for HeaderMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.insert(name, value);
        }
        map
    }
}

impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json");
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn test_insert_overwrites_regardless_of_case() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/html");
        headers.insert("content-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", "test");
        headers.insert("Cookie", "a=b");
        headers.insert("Referer", "https://example.com/");

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["User-Agent", "Cookie", "Referer"]);
    }

    #[test]
    fn test_remove() {
        let mut headers = HeaderMap::from([("Cookie", "a=b"), ("Referer", "r")]);
        assert_eq!(headers.remove("cookie"), Some("a=b".to_string()));
        assert_eq!(headers.get("Cookie"), None);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_serializes_as_map() {
        let headers = HeaderMap::from([("Cookie", "a=b")]);
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"Cookie":"a=b"}"#);
    }
}
