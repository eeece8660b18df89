//! PostgreSQL `WHERE` rendering for scopes
//!
//! Turns a [`Scope`] into parameterized SQL text (`$1`, `$2`, ...) plus the
//! typed parameters to bind, for stores backed by PostgreSQL.
//!
//! # Column mapping
//!
//! Scope fields are record paths, not SQL. A [`ColumnMap`] maps each path to
//! a SQL expression and records whether that expression is an array. Paths
//! without a mapping fall back to:
//! - `field` → `"field"`
//! - `data.result` → `"data" #>> '{result}'` (JSONB text lookup)
//!
//! # Null handling
//!
//! `Not` renders as `NOT COALESCE(..., FALSE)` so a negated substring match
//! keeps rows whose column is NULL, while `NotIn` keeps SQL semantics and
//! drops them. This mirrors [`Scope::matches`], including empty value lists:
//! an empty `In` is `FALSE` and an empty `NotIn` only requires the column.

use crate::core::field::FieldValue;
use crate::core::predicate::{Case, Scope};
use std::collections::HashMap;

/// A mapped SQL expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub expr: String,
    pub array: bool,
}

/// Field path → SQL expression
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<String, Column>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a field to a scalar expression
    pub fn scalar(mut self, field: impl Into<String>, expr: impl Into<String>) -> Self {
        self.columns.insert(
            field.into(),
            Column {
                expr: expr.into(),
                array: false,
            },
        );
        self
    }

    /// Map a field to an array expression
    pub fn array(mut self, field: impl Into<String>, expr: impl Into<String>) -> Self {
        self.columns.insert(
            field.into(),
            Column {
                expr: expr.into(),
                array: true,
            },
        );
        self
    }

    /// The expression for `field`, falling back to a column or JSONB lookup
    pub fn resolve(&self, field: &str) -> Column {
        if let Some(column) = self.columns.get(field) {
            return column.clone();
        }

        let expr = match field.split_once('.') {
            None => quote_ident(field),
            Some((column, rest)) => format!(
                "{} #>> '{{{}}}'",
                quote_ident(column),
                rest.split('.')
                    .map(|segment| segment.replace('\'', "''"))
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        };
        Column { expr, array: false }
    }
}

/// Rendered `WHERE` clause and its parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlWhere {
    pub clause: String,
    pub params: Vec<FieldValue>,
}

/// Render `scope` with `columns`
pub fn render_where(scope: &Scope, columns: &ColumnMap) -> SqlWhere {
    let mut renderer = Renderer {
        columns,
        params: Vec::new(),
    };
    let clause = renderer.render(scope);
    SqlWhere {
        clause,
        params: renderer.params,
    }
}

struct Renderer<'a> {
    columns: &'a ColumnMap,
    params: Vec<FieldValue>,
}

impl Renderer<'_> {
    fn bind(&mut self, value: FieldValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn bind_all(&mut self, values: &[FieldValue]) -> String {
        values
            .iter()
            .map(|v| self.bind(v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render(&mut self, scope: &Scope) -> String {
        match scope {
            Scope::All => "TRUE".to_string(),
            Scope::Eq { field, value } => {
                let column = self.columns.resolve(field);
                let param = self.bind(value.clone());
                if column.array {
                    format!("{} = ANY({})", param, column.expr)
                } else {
                    format!("{} = {}", column.expr, param)
                }
            }
            Scope::In { values, .. } if values.is_empty() => "FALSE".to_string(),
            Scope::In { field, values } => {
                let column = self.columns.resolve(field);
                let params = self.bind_all(values);
                if column.array {
                    format!("{} && ARRAY[{}]", column.expr, params)
                } else {
                    format!("{} IN ({})", column.expr, params)
                }
            }
            Scope::NotIn { field, values } if values.is_empty() => {
                let column = self.columns.resolve(field);
                if column.array {
                    format!("cardinality({}) > 0", column.expr)
                } else {
                    format!("{} IS NOT NULL", column.expr)
                }
            }
            Scope::NotIn { field, values } => {
                let column = self.columns.resolve(field);
                let params = self.bind_all(values);
                if column.array {
                    format!(
                        "(cardinality({expr}) > 0 AND NOT ({expr} && ARRAY[{params}]))",
                        expr = column.expr
                    )
                } else {
                    format!("{} NOT IN ({})", column.expr, params)
                }
            }
            Scope::Lt { field, value } => self.comparison(field, "<", value),
            Scope::Lte { field, value } => self.comparison(field, "<=", value),
            Scope::Gt { field, value } => self.comparison(field, ">", value),
            Scope::Gte { field, value } => self.comparison(field, ">=", value),
            Scope::Between { field, low, high } => {
                let column = self.columns.resolve(field);
                let low = self.bind(low.clone());
                let high = self.bind(high.clone());
                format!("{} BETWEEN {} AND {}", column.expr, low, high)
            }
            Scope::Contains {
                field,
                pattern,
                case,
            } => {
                let column = self.columns.resolve(field);
                let like = match case {
                    Case::Sensitive => "LIKE",
                    Case::Insensitive => "ILIKE",
                };
                let param = self.bind(FieldValue::Text(format!("%{}%", escape_like(pattern))));
                if column.array {
                    format!(
                        "EXISTS (SELECT 1 FROM unnest({}) AS elem WHERE elem {} {})",
                        column.expr, like, param
                    )
                } else {
                    format!("{} {} {}", column.expr, like, param)
                }
            }
            Scope::Missing { field } => {
                let column = self.columns.resolve(field);
                if column.array {
                    format!(
                        "({expr} IS NULL OR cardinality({expr}) = 0)",
                        expr = column.expr
                    )
                } else {
                    format!("{} IS NULL", column.expr)
                }
            }
            Scope::And { scopes } => self.join(scopes, " AND ", "TRUE"),
            Scope::Or { scopes } => self.join(scopes, " OR ", "FALSE"),
            Scope::Not { scope } => format!("NOT COALESCE({}, FALSE)", self.render(scope)),
        }
    }

    fn comparison(&mut self, field: &str, op: &str, value: &FieldValue) -> String {
        let column = self.columns.resolve(field);
        let param = self.bind(value.clone());
        format!("{} {} {}", column.expr, op, param)
    }

    fn join(&mut self, scopes: &[Scope], separator: &str, empty: &str) -> String {
        if scopes.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = scopes.iter().map(|s| self.render(s)).collect();
        format!("({})", parts.join(separator))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
