//! Request parameters
//!
//! Parameters are string-keyed JSON scalars. The same map is rendered either
//! into a query string (GET) or into a JSON object body (POST), so values keep
//! their JSON type until the transport is chosen.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the authentication parameter present on every request.
pub const TOKEN_PARAM: &str = "token";

/// An ordered map of request parameters.
///
/// A `Null` value means "absent": it is dropped by [`Params::merge`] and never
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```rust
    /// use diffbot_kg::Params;
    ///
    /// let params = Params::new()
    ///     .with("query", "type:Organization")
    ///     .with("size", 10);
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Look up a parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameter names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overlay `overrides` on top of `self`.
    ///
    /// Keys from `overrides` win on conflict, and any key whose resulting
    /// value is `Null` is dropped.
    pub fn merge(&self, overrides: Option<&Params>) -> Params {
        let mut merged = self.0.clone();
        if let Some(overrides) = overrides {
            for (key, value) in &overrides.0 {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged.retain(|_, value| !value.is_null());
        Params(merged)
    }

    /// Split off the token, leaving every other parameter behind.
    ///
    /// Returns `(token_only, rest)`.
    pub fn split_token(mut self) -> (Params, Params) {
        let mut token = Params::new();
        if let Some(value) = self.0.remove(TOKEN_PARAM) {
            token.0.insert(TOKEN_PARAM.to_string(), value);
        }
        (token, self)
    }

    /// Render as `(name, value)` pairs for a query string.
    ///
    /// Strings are sent raw, other scalars as their JSON text, and arrays or
    /// objects as compact JSON.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), query_value(value)))
            .collect()
    }

    /// Render as a JSON object body.
    pub fn into_json(self) -> Value {
        Value::Object(self.0.into_iter().collect::<Map<String, Value>>())
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
