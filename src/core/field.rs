//! Typed operand values and their comparison against stored JSON

use crate::core::dates::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A typed value a scope compares a field against
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a date if possible
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether a stored JSON leaf equals this value
    ///
    /// Integers also match numeric strings and text also matches numbers,
    /// since ids come through query strings as text.
    pub fn matches_json(&self, leaf: &Value) -> bool {
        self.compare_json(leaf) == Some(Ordering::Equal)
    }

    /// Order a stored JSON leaf relative to this value (`leaf.cmp(self)`)
    ///
    /// `None` when the leaf cannot be read as the same type.
    pub fn compare_json(&self, leaf: &Value) -> Option<Ordering> {
        match self {
            FieldValue::Integer(expected) => {
                let actual = match leaf {
                    Value::Number(n) => n.as_i64()?,
                    Value::String(s) => s.trim().parse().ok()?,
                    _ => return None,
                };
                Some(actual.cmp(expected))
            }
            FieldValue::Date(expected) => {
                let actual = parse_date(leaf.as_str()?)?;
                Some(actual.cmp(expected))
            }
            FieldValue::Text(expected) => match leaf {
                Value::String(s) => Some(s.as_str().cmp(expected.as_str())),
                Value::Number(n) => Some(n.to_string().as_str().cmp(expected.as_str())),
                Value::Bool(b) => Some(b.to_string().as_str().cmp(expected.as_str())),
                _ => None,
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// How raw filter arguments are read for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl FieldKind {
    /// Read one raw argument; `None` drops it
    pub fn parse(&self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
        }
    }

    /// Read every argument, dropping the ones that do not parse
    pub fn parse_all(&self, raw: &[String]) -> Vec<FieldValue> {
        raw.iter().filter_map(|r| self.parse(r)).collect()
    }
}
