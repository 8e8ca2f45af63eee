// Ordered request parameters for the action API.
//
// The API is flat key=value on both GET (query string) and POST (form
// body), so parameters are kept as an ordered list of string pairs.
// Setting an existing key replaces it in place.

use serde::Serialize;

/// Placeholder value for `token` that the session swaps for its CSRF token.
pub const AUTO_TOKEN: &str = "__AUTO__";

/// Ordered key/value parameters for one API request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `action`, with `format=json` preset.
    pub fn action(action: &str) -> Self {
        Self::new().with("action", action).with("format", "json")
    }

    /// Start a write request for `action`: `format=json`, `bot=1`, and
    /// `token=__AUTO__` so the session fills in its CSRF token.
    pub fn edit(action: &str) -> Self {
        Self::action(action)
            .with("bot", "1")
            .with("token", AUTO_TOKEN)
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Insert `key` only if it is not present yet.
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        if !self.contains(key) {
            self.0.push((key.to_owned(), value.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}
