//! Path and query parameters carried by a [`Route`](crate::Route).
//!
//! - [`RouteParams`] — values extracted from `:param` segments of a template
//!   url (e.g. `id` in `/users/:id`), or supplied by the caller to fill them.
//! - [`QueryParams`] — the `?key=value&...` part of a location. Keys are
//!   single-valued; the last occurrence wins when parsing.
//!
//! Both are backed by a `BTreeMap`, so two maps with the same entries compare
//! equal and serialize identically no matter how they were built.
//!
//! # Example
//!
//! ```
//! use gpui_route_stack::{QueryParams, RouteParams};
//!
//! let mut params = RouteParams::new();
//! params.insert("id", "42");
//! assert_eq!(params.get_as::<u32>("id"), Some(42));
//!
//! let query = QueryParams::from_query_string("page=1&sort=name");
//! assert_eq!(query.get_as::<u32>("page"), Some(1));
//! assert_eq!(query.get("sort"), Some("name"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

macro_rules! string_map {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            values: BTreeMap<String, String>,
        }

        impl $name {
            /// Create an empty map.
            pub fn new() -> Self {
                Self::default()
            }

            /// Get a value by key.
            pub fn get(&self, key: &str) -> Option<&str> {
                self.values.get(key).map(String::as_str)
            }

            /// Get a value and parse it as `T`.
            ///
            /// Returns `None` if the key is missing or the value does not parse.
            pub fn get_as<T>(&self, key: &str) -> Option<T>
            where
                T: std::str::FromStr,
            {
                self.values.get(key)?.parse().ok()
            }

            /// Insert or overwrite a value.
            pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
                self.values.insert(key.into(), value.into());
            }

            /// Builder-style [`insert`](Self::insert).
            pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
                self.insert(key, value);
                self
            }

            /// Remove a value, returning it if present.
            pub fn remove(&mut self, key: &str) -> Option<String> {
                self.values.remove(key)
            }

            /// Return `true` if the key is present.
            pub fn contains(&self, key: &str) -> bool {
                self.values.contains_key(key)
            }

            /// Iterate over `(key, value)` pairs in key order.
            pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
                self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
            }

            /// Return `true` if there are no entries.
            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            /// Return the number of entries.
            pub fn len(&self) -> usize {
                self.values.len()
            }

            /// Overlay `overrides` on top of `base`.
            ///
            /// Keys present in both take the value from `overrides`.
            pub fn merge(base: &Self, overrides: &Self) -> Self {
                let mut merged = base.clone();
                for (key, value) in &overrides.values {
                    merged.values.insert(key.clone(), value.clone());
                }
                merged
            }
        }

        impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self {
                    values: iter
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                }
            }
        }
    };
}

string_map! {
    /// Path parameters extracted from (or used to fill) `:param` segments.
    ///
    /// ```
    /// use gpui_route_stack::RouteParams;
    ///
    /// let params: RouteParams = [("userId", "7"), ("postId", "9")].into_iter().collect();
    /// assert_eq!(params.get("userId"), Some("7"));
    /// assert_eq!(params.len(), 2);
    /// ```
    RouteParams
}

string_map! {
    /// Query parameters of a route.
    ///
    /// Not part of a route's identity: two routes that differ only in query
    /// parameters occupy the same stack slot and share a cache key.
    QueryParams
}

impl QueryParams {
    /// Parse a query string (without the leading `?`).
    ///
    /// Pairs without `=` are kept with an empty value. Keys and values are
    /// percent-decoded, `+` decodes to a space.
    ///
    /// ```
    /// use gpui_route_stack::QueryParams;
    ///
    /// let query = QueryParams::from_query_string("q=hello+world&flag");
    /// assert_eq!(query.get("q"), Some("hello world"));
    /// assert_eq!(query.get("flag"), Some(""));
    /// ```
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_uri_component(key), decode_uri_component(value));
        }
        params
    }

    /// Serialize into a query string (without the leading `?`), keys sorted.
    ///
    /// ```
    /// use gpui_route_stack::QueryParams;
    ///
    /// let query = QueryParams::new().with("sort", "name").with("page", "1");
    /// assert_eq!(query.to_query_string(), "page=1&sort=name");
    /// ```
    pub fn to_query_string(&self) -> String {
        self.values
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    encode_uri_component(key),
                    encode_uri_component(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode everything outside the unreserved set.
fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Decode `%XX` escapes and `+`. Malformed escapes are kept verbatim.
fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 3;
                continue;
            }
            b'+' => out.push(b' '),
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_merge_overrides_win() {
        let base = QueryParams::new().with("tab", "info").with("page", "1");
        let explicit = QueryParams::new().with("page", "3");

        let merged = QueryParams::merge(&base, &explicit);
        assert_eq!(merged.get("tab"), Some("info"));
        assert_eq!(merged.get("page"), Some("3"));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = QueryParams::new().with("a", "1").with("b", "2");
        let b = QueryParams::new().with("b", "2").with("a", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_string_parse() {
        let query = QueryParams::from_query_string("page=1&sort=name&page=2");
        assert_eq!(query.get("page"), Some("2"));
        assert_eq!(query.get("sort"), Some("name"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::from_query_string("").is_empty());
        assert!(QueryParams::from_query_string("&&").is_empty());
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("a@b"), "a%40b");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("hello+world"), "hello world");
        assert_eq!(decode_uri_component("%C3%A9"), "é");
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%zz"), "%zz");
    }

    #[test]
    fn test_query_string_roundtrip_with_escapes() {
        let query = QueryParams::new().with("q", "rust gpui").with("tag", "a&b");
        let parsed = QueryParams::from_query_string(&query.to_query_string());
        assert_eq!(parsed, query);
    }
}
