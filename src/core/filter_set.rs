//! Filter sets: `topic.operator` keys mapped to string arguments

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A parsed `topic.operator` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKey<'a> {
    pub topic: &'a str,
    pub operator: &'a str,
}

impl<'a> FilterKey<'a> {
    /// Split on the first `.`
    ///
    /// Both halves must be non-empty and the operator may not contain a
    /// further `.`; anything else is not a filter key.
    pub fn parse(key: &'a str) -> Option<Self> {
        let (topic, operator) = key.split_once('.')?;
        if topic.is_empty() || operator.is_empty() || operator.contains('.') {
            return None;
        }
        Some(Self { topic, operator })
    }
}

/// Caller-supplied filters for one request
///
/// Keys keep insertion order. Values are always lists of strings; the
/// constructors below normalise whatever the upstream query parser produced.
///
/// # Example
/// ```rust,ignore
/// let filters = FilterSet::from_value(&json!({
///     "result.in": ["Phone", "Email"],
///     "communicationDate.bef": "2022/12/15",
/// }));
/// assert_eq!(filters.get("communicationDate.bef"), Some(&["2022/12/15".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: IndexMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from deserialized query parameters
    ///
    /// Anything other than a JSON object (`null`, an array, a scalar) is
    /// treated as "no filters". Scalar values become one-element lists;
    /// numbers and booleans are stringified; nulls and nested objects are
    /// dropped.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let entries = map
            .iter()
            .map(|(key, raw)| (key.clone(), stringify_args(raw)))
            .collect();

        Self { entries }
    }

    /// Build from raw `key=value` pairs; repeated keys accumulate
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::default();
        for (key, value) in pairs {
            set.push(key, value);
        }
        set
    }

    /// Replace the arguments for `key`
    pub fn insert(&mut self, key: impl Into<String>, args: Vec<String>) {
        self.entries.insert(key.into(), args);
    }

    /// Append one argument to `key`
    pub fn push(&mut self, key: impl Into<String>, arg: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(arg.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any well-formed key names `topic`
    pub fn has_topic(&self, topic: &str) -> bool {
        self.entries
            .keys()
            .filter_map(|key| FilterKey::parse(key))
            .any(|key| key.topic == topic)
    }
}

fn stringify_args(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items.iter().filter_map(stringify_scalar).collect(),
        other => stringify_scalar(other).into_iter().collect(),
    }
}

fn stringify_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<&Value> for FilterSet {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for FilterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, Vec<String>)>>(iter: T) -> Self {
        let mut set = Self::default();
        for (key, args) in iter {
            set.insert(key, args);
        }
        set
    }
}
