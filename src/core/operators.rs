//! Reusable operator transforms
//!
//! Every domain registry is assembled from these builders. Each returns a
//! closure over the field it constrains. Every transform is total: arguments
//! it cannot use produce [`Scope::All`].

use crate::core::dates::{parse_date, parse_date_range};
use crate::core::field::{FieldKind, FieldValue};
use crate::core::predicate::{Case, Scope};
use crate::core::scope::ScopeContext;

/// Whether a single-date bound includes the day itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Exclusive,
    Inclusive,
}

/// `field IN args`
pub fn with_membership(
    field: &'static str,
    kind: FieldKind,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let values = kind.parse_all(args);
        if values.is_empty() {
            Scope::All
        } else {
            Scope::is_in(field, values)
        }
    }
}

/// `field NOT IN args`
pub fn without_membership(
    field: &'static str,
    kind: FieldKind,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let values = kind.parse_all(args);
        if values.is_empty() {
            Scope::All
        } else {
            Scope::not_in(field, values)
        }
    }
}

/// `field` contains any of the args as a substring
pub fn contains_text(
    field: &'static str,
    case: Case,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    contains_over(vec![field], case)
}

/// `field` contains none of the args
pub fn not_contains_text(
    field: &'static str,
    case: Case,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    negated(contains_text(field, case))
}

/// Any of `fields` contains any of the args
pub fn contains_in_any(
    fields: &'static [&'static str],
    case: Case,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    contains_over(fields.to_vec(), case)
}

fn contains_over(
    fields: Vec<&'static str>,
    case: Case,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let patterns: Vec<&String> = args.iter().filter(|a| !a.is_empty()).collect();
        if patterns.is_empty() || fields.is_empty() {
            return Scope::All;
        }
        Scope::or(fields.iter().flat_map(|field| {
            patterns
                .iter()
                .map(move |pattern| Scope::contains(*field, pattern.as_str(), case))
        }))
    }
}

/// None of `fields` contains any of the args
pub fn not_contains_in_any(
    fields: &'static [&'static str],
    case: Case,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    negated(contains_in_any(fields, case))
}

/// Complement of another transform; a neutral result stays neutral
pub fn negated<F>(op: F) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static
where
    F: Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static,
{
    move |args: &[String], context: &ScopeContext| {
        let scope = op(args, context);
        if scope.is_all() { scope } else { scope.negate() }
    }
}

/// `field` before the date in `args[0]`
pub fn before_date(
    field: &'static str,
    bound: DateBound,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let Some(day) = args.first().and_then(|raw| parse_date(raw)) else {
            return Scope::All;
        };
        let field = field.to_string();
        let value = FieldValue::Date(day);
        match bound {
            DateBound::Exclusive => Scope::Lt { field, value },
            DateBound::Inclusive => Scope::Lte { field, value },
        }
    }
}

/// `field` after the date in `args[0]`
pub fn after_date(
    field: &'static str,
    bound: DateBound,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let Some(day) = args.first().and_then(|raw| parse_date(raw)) else {
            return Scope::All;
        };
        let field = field.to_string();
        let value = FieldValue::Date(day);
        match bound {
            DateBound::Exclusive => Scope::Gt { field, value },
            DateBound::Inclusive => Scope::Gte { field, value },
        }
    }
}

/// `field` within the inclusive range `args[0]` (`start-end`)
pub fn within_date(
    field: &'static str,
) -> impl Fn(&[String], &ScopeContext) -> Scope + Send + Sync + Clone + 'static {
    move |args: &[String], _: &ScopeContext| {
        let Some(range) = args.first().and_then(|raw| parse_date_range(raw)) else {
            return Scope::All;
        };
        Scope::Between {
            field: field.to_string(),
            low: FieldValue::Date(range.start),
            high: FieldValue::Date(range.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn ctx() -> ScopeContext {
        ScopeContext::default()
    }

    #[test]
    fn test_membership_pair() {
        let with = with_membership("result", FieldKind::Text);
        let without = without_membership("result", FieldKind::Text);
        assert_eq!(
            with(&args(&["B", "A", "B"]), &ctx()),
            Scope::is_in("result", vec!["A".into(), "B".into()])
        );
        assert_eq!(
            without(&args(&["A"]), &ctx()),
            Scope::not_in("result", vec!["A".into()])
        );
        assert_eq!(with(&[], &ctx()), Scope::All);
        assert_eq!(without(&[], &ctx()), Scope::All);
    }

    #[test]
    fn test_integer_membership_drops_garbage() {
        let with = with_membership("regionId", FieldKind::Integer);
        assert_eq!(
            with(&args(&["3", "three"]), &ctx()),
            Scope::is_in("regionId", vec![FieldValue::Integer(3)])
        );
        assert_eq!(with(&args(&["three"]), &ctx()), Scope::All);
    }

    #[test]
    fn test_contains_ors_patterns() {
        let ctn = contains_text("author.name", Case::Sensitive);
        let scope = ctn(&args(&["Tim", "Pat"]), &ctx());
        assert!(scope.matches(&json!({"author": {"name": "Pat Doe"}})));
        assert!(scope.matches(&json!({"author": {"name": "Timothy"}})));
        assert!(!scope.matches(&json!({"author": {"name": "tim"}})));
        assert_eq!(ctn(&args(&[""]), &ctx()), Scope::All);
    }

    #[test]
    fn test_not_contains_negates() {
        let nctn = not_contains_text("author.name", Case::Insensitive);
        let scope = nctn(&args(&["tim"]), &ctx());
        assert!(!scope.matches(&json!({"author": {"name": "Timothy"}})));
        assert!(scope.matches(&json!({"author": {"name": "Pat"}})));
        assert_eq!(nctn(&[], &ctx()), Scope::All);
    }

    #[test]
    fn test_contains_in_any_spans_fields() {
        static FIELDS: &[&str] = &["name", "objectives.title"];
        let ctn = contains_in_any(FIELDS, Case::Insensitive);
        let scope = ctn(&args(&["budget"]), &ctx());
        assert!(scope.matches(&json!({"name": "x", "objectives": [{"title": "Budget review"}]})));
        assert!(!scope.matches(&json!({"name": "x", "objectives": []})));
        let nctn = not_contains_in_any(FIELDS, Case::Insensitive);
        assert!(nctn(&args(&["budget"]), &ctx()).matches(&json!({"name": "x"})));
    }

    #[test]
    fn test_date_bounds() {
        let record = json!({"startDate": "06/06/2021"});
        let exclusive = before_date("startDate", DateBound::Exclusive);
        let inclusive = before_date("startDate", DateBound::Inclusive);
        assert!(!exclusive(&args(&["2021/06/06"]), &ctx()).matches(&record));
        assert!(inclusive(&args(&["2021/06/06"]), &ctx()).matches(&record));

        let after = after_date("startDate", DateBound::Inclusive);
        assert!(after(&args(&["2021-06-06"]), &ctx()).matches(&record));
        assert!(!after(&args(&["2021-06-07"]), &ctx()).matches(&record));
    }

    #[test]
    fn test_dates_use_first_argument_only() {
        let before = before_date("startDate", DateBound::Exclusive);
        assert_eq!(
            before(&args(&["2021/06/06", "2030/01/01"]), &ctx()),
            before(&args(&["2021/06/06"]), &ctx())
        );
        assert_eq!(before(&args(&["garbage", "2030/01/01"]), &ctx()), Scope::All);
    }

    #[test]
    fn test_malformed_dates_are_neutral() {
        assert_eq!(before_date("d", DateBound::Exclusive)(&args(&["not-a-date"]), &ctx()), Scope::All);
        assert_eq!(after_date("d", DateBound::Exclusive)(&args(&["invalid"]), &ctx()), Scope::All);
        assert_eq!(within_date("d")(&args(&["2021/06/07"]), &ctx()), Scope::All);
        assert_eq!(within_date("d")(&args(&["bad-date-worse-date"]), &ctx()), Scope::All);
        assert_eq!(within_date("d")(&[], &ctx()), Scope::All);
    }

    #[test]
    fn test_within_is_inclusive() {
        let within = within_date("startDate");
        let scope = within(&args(&["2021/06/07-2021/06/07"]), &ctx());
        assert!(scope.matches(&json!({"startDate": "2021/06/07"})));
        assert!(!scope.matches(&json!({"startDate": "2021/06/08"})));
    }
}
