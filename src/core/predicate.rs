//! The scope predicate tree
//!
//! A [`Scope`] is the structured constraint an operator produces and the
//! storage layer consumes. Scopes are built once and never mutated; the
//! combinators below return new values in a canonical form so that two
//! scopes describing the same constraint compare equal.

use crate::core::field::FieldValue;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Case handling for substring matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Sensitive,
    Insensitive,
}

/// A composable constraint over named fields
///
/// Field names are dotted paths into a record (`data.result`,
/// `collaborators.name`). Paths crossing arrays fan out, so a constraint on
/// such a field holds when it holds for any element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Scope {
    /// Neutral constraint, matches everything
    All,
    Eq {
        field: String,
        value: FieldValue,
    },
    In {
        field: String,
        values: Vec<FieldValue>,
    },
    /// Field present and none of its values listed
    NotIn {
        field: String,
        values: Vec<FieldValue>,
    },
    Lt {
        field: String,
        value: FieldValue,
    },
    Lte {
        field: String,
        value: FieldValue,
    },
    Gt {
        field: String,
        value: FieldValue,
    },
    Gte {
        field: String,
        value: FieldValue,
    },
    /// Inclusive on both ends
    Between {
        field: String,
        low: FieldValue,
        high: FieldValue,
    },
    Contains {
        field: String,
        pattern: String,
        case: Case,
    },
    /// Field absent, null or an empty list
    Missing {
        field: String,
    },
    And {
        scopes: Vec<Scope>,
    },
    /// An empty `Or` matches nothing
    Or {
        scopes: Vec<Scope>,
    },
    Not {
        scope: Box<Scope>,
    },
}

impl Scope {
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Scope::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Scope::In {
            field: field.into(),
            values: canonical_values(values),
        }
    }

    pub fn not_in(field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Scope::NotIn {
            field: field.into(),
            values: canonical_values(values),
        }
    }

    pub fn contains(field: impl Into<String>, pattern: impl Into<String>, case: Case) -> Self {
        Scope::Contains {
            field: field.into(),
            pattern: pattern.into(),
            case,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Scope::Missing {
            field: field.into(),
        }
    }

    /// A scope that matches nothing
    pub fn none() -> Self {
        Scope::Or { scopes: Vec::new() }
    }

    /// Whether this is the neutral constraint
    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }

    /// Conjunction in canonical form
    ///
    /// Nested `And`s are flattened, neutral parts dropped, duplicates removed
    /// and the remainder sorted. No parts gives [`Scope::All`]; one part is
    /// returned unwrapped.
    pub fn and(parts: impl IntoIterator<Item = Scope>) -> Self {
        let mut scopes = Vec::new();
        for part in parts {
            match part {
                Scope::All => {}
                Scope::And { scopes: inner } => scopes.extend(inner),
                other => scopes.push(other),
            }
        }
        scopes.sort();
        scopes.dedup();

        match scopes.len() {
            0 => Scope::All,
            1 => scopes.remove(0),
            _ => Scope::And { scopes },
        }
    }

    /// Disjunction in canonical form
    ///
    /// A neutral part makes the whole disjunction neutral. No parts gives
    /// [`Scope::none`].
    pub fn or(parts: impl IntoIterator<Item = Scope>) -> Self {
        let mut scopes = Vec::new();
        for part in parts {
            match part {
                Scope::All => return Scope::All,
                Scope::Or { scopes: inner } => scopes.extend(inner),
                other => scopes.push(other),
            }
        }
        scopes.sort();
        scopes.dedup();

        if scopes.len() == 1 {
            scopes.remove(0)
        } else {
            Scope::Or { scopes }
        }
    }

    /// Negation; double negation cancels
    pub fn negate(self) -> Self {
        match self {
            Scope::All => Scope::none(),
            Scope::Not { scope } => *scope,
            other => Scope::Not {
                scope: Box::new(other),
            },
        }
    }

    /// Evaluate against a JSON record
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Scope::All => true,
            Scope::Eq { field, value } => {
                resolve(record, field).iter().any(|leaf| value.matches_json(leaf))
            }
            Scope::In { field, values } => resolve(record, field)
                .iter()
                .any(|leaf| values.iter().any(|v| v.matches_json(leaf))),
            Scope::NotIn { field, values } => {
                let leaves = resolve(record, field);
                !leaves.is_empty()
                    && !leaves
                        .iter()
                        .any(|leaf| values.iter().any(|v| v.matches_json(leaf)))
            }
            Scope::Lt { field, value } => compares(record, field, value, |o| o == Ordering::Less),
            Scope::Lte { field, value } => {
                compares(record, field, value, |o| o != Ordering::Greater)
            }
            Scope::Gt { field, value } => {
                compares(record, field, value, |o| o == Ordering::Greater)
            }
            Scope::Gte { field, value } => compares(record, field, value, |o| o != Ordering::Less),
            Scope::Between { field, low, high } => resolve(record, field).iter().any(|leaf| {
                low.compare_json(leaf).is_some_and(|o| o != Ordering::Less)
                    && high.compare_json(leaf).is_some_and(|o| o != Ordering::Greater)
            }),
            Scope::Contains {
                field,
                pattern,
                case,
            } => resolve(record, field)
                .iter()
                .filter_map(|leaf| leaf.as_str())
                .any(|text| match case {
                    Case::Sensitive => text.contains(pattern.as_str()),
                    Case::Insensitive => text.to_lowercase().contains(&pattern.to_lowercase()),
                }),
            Scope::Missing { field } => resolve(record, field).is_empty(),
            Scope::And { scopes } => scopes.iter().all(|s| s.matches(record)),
            Scope::Or { scopes } => scopes.iter().any(|s| s.matches(record)),
            Scope::Not { scope } => !scope.matches(record),
        }
    }

    /// Every field path this scope reads, sorted and de-duplicated
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Scope::All => {}
            Scope::Eq { field, .. }
            | Scope::In { field, .. }
            | Scope::NotIn { field, .. }
            | Scope::Lt { field, .. }
            | Scope::Lte { field, .. }
            | Scope::Gt { field, .. }
            | Scope::Gte { field, .. }
            | Scope::Between { field, .. }
            | Scope::Contains { field, .. }
            | Scope::Missing { field } => out.push(field),
            Scope::And { scopes } | Scope::Or { scopes } => {
                scopes.iter().for_each(|s| s.collect_fields(out))
            }
            Scope::Not { scope } => scope.collect_fields(out),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::All
    }
}

fn canonical_values(mut values: Vec<FieldValue>) -> Vec<FieldValue> {
    values.sort();
    values.dedup();
    values
}

fn compares(
    record: &Value,
    field: &str,
    value: &FieldValue,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    resolve(record, field)
        .iter()
        .any(|leaf| value.compare_json(leaf).is_some_and(&accept))
}

/// Walk a dotted path, fanning out over arrays; nulls are dropped
pub(crate) fn resolve<'a>(record: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![record];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            child(value, segment, &mut next);
        }
        current = next;
    }

    let mut leaves = Vec::new();
    for value in current {
        flatten(value, &mut leaves);
    }
    leaves
}

fn child<'a>(value: &'a Value, segment: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(segment) {
                out.push(found);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| child(item, segment, out)),
        _ => {}
    }
}

fn flatten<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| flatten(item, out)),
        Value::Null => {}
        other => out.push(other),
    }
}
