//! Communication log filters
//!
//! Records carry their form answers under `data` and the creating user under
//! `author`:
//!
//! ```json
//! {
//!   "id": 12,
//!   "userId": 4,
//!   "author": { "name": "Timothy Smith", "homeRegionId": 1 },
//!   "recipients": [{ "id": 7 }],
//!   "data": { "communicationDate": "2023/01/01", "result": "...", "method": "...", "purpose": "..." }
//! }
//! ```
//!
//! Dates here use strict bounds for `bef`/`aft`. `creator.ctn` is a
//! case-sensitive substring match on the author's name.

use crate::core::field::FieldKind;
use crate::core::filter_set::FilterSet;
use crate::core::operators::{
    DateBound, after_date, before_date, contains_text, not_contains_text, with_membership,
    within_date, without_membership,
};
use crate::core::predicate::{Case, Scope};
use crate::core::registry::TopicRegistry;
use crate::core::scope::{ScopeContext, ValidTopics, filters_to_scopes};
use crate::storage::sql::ColumnMap;
use std::sync::LazyLock;

pub const COMMUNICATION_DATE: &str = "data.communicationDate";
pub const RESULT: &str = "data.result";
pub const METHOD: &str = "data.method";
pub const PURPOSE: &str = "data.purpose";
pub const CREATOR_NAME: &str = "author.name";
pub const REGION_ID: &str = "author.homeRegionId";
pub const ID: &str = "id";
pub const RECIPIENT_ID: &str = "recipients.id";

static REGISTRY: LazyLock<TopicRegistry> = LazyLock::new(|| {
    TopicRegistry::builder("communicationLog")
        .operator(
            "communicationDate",
            "bef",
            before_date(COMMUNICATION_DATE, DateBound::Exclusive),
        )
        .operator(
            "communicationDate",
            "aft",
            after_date(COMMUNICATION_DATE, DateBound::Exclusive),
        )
        .aliases("communicationDate", &["win", "in"], within_date(COMMUNICATION_DATE))
        .operator("result", "in", with_membership(RESULT, FieldKind::Text))
        .operator("result", "nin", without_membership(RESULT, FieldKind::Text))
        .operator("method", "in", with_membership(METHOD, FieldKind::Text))
        .operator("method", "nin", without_membership(METHOD, FieldKind::Text))
        .operator("purpose", "in", with_membership(PURPOSE, FieldKind::Text))
        .operator("purpose", "nin", without_membership(PURPOSE, FieldKind::Text))
        .operator("creator", "in", with_membership(CREATOR_NAME, FieldKind::Text))
        .operator("creator", "nin", without_membership(CREATOR_NAME, FieldKind::Text))
        .operator("creator", "ctn", contains_text(CREATOR_NAME, Case::Sensitive))
        .operator("creator", "nctn", not_contains_text(CREATOR_NAME, Case::Sensitive))
        .operator("region", "in", with_membership(REGION_ID, FieldKind::Integer))
        .operator("region", "nin", without_membership(REGION_ID, FieldKind::Integer))
        .operator("id", "in", with_membership(ID, FieldKind::Integer))
        .operator("id", "nin", without_membership(ID, FieldKind::Integer))
        .build()
});

/// The communication log registry
pub fn registry() -> &'static TopicRegistry {
    &REGISTRY
}

/// Translate communication log filters
pub fn communication_log_filters_to_scopes(
    filters: &FilterSet,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    filters_to_scopes(filters, &REGISTRY, context, valid_topics)
}

/// `communicationDate.bef`
pub fn before_communication_date(args: &[String]) -> Scope {
    apply("communicationDate", "bef", args)
}

/// `communicationDate.aft`
pub fn after_communication_date(args: &[String]) -> Scope {
    apply("communicationDate", "aft", args)
}

/// `communicationDate.win`; a value without a `-` separator is neutral
pub fn within_communication_date(args: &[String]) -> Scope {
    apply("communicationDate", "win", args)
}

fn apply(topic: &str, operator: &str, args: &[String]) -> Scope {
    REGISTRY
        .lookup(topic, operator)
        .map(|op| op.apply(args, &ScopeContext::default()))
        .unwrap_or_default()
}

/// Logs attached to a recipient, the base constraint of the recipient log list
pub fn for_recipient(recipient_id: i64) -> Scope {
    Scope::equals(RECIPIENT_ID, recipient_id)
}

/// SQL columns for `"CommunicationLogs"` joined with its author
pub fn column_map() -> ColumnMap {
    ColumnMap::new()
        .scalar(ID, "\"CommunicationLog\".\"id\"")
        .scalar(CREATOR_NAME, "\"author\".\"name\"")
        .scalar(REGION_ID, "\"author\".\"homeRegionId\"")
        .array(RECIPIENT_ID, "\"recipientIds\"")
        .scalar(
            COMMUNICATION_DATE,
            "(\"CommunicationLog\".\"data\" ->> 'communicationDate')::date",
        )
        .scalar(RESULT, "\"CommunicationLog\".\"data\" ->> 'result'")
        .scalar(METHOD, "\"CommunicationLog\".\"data\" ->> 'method'")
        .scalar(PURPOSE, "\"CommunicationLog\".\"data\" ->> 'purpose'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldValue;
    use chrono::NaiveDate;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_registry_topics() {
        assert_eq!(
            registry().topics(),
            vec!["communicationDate", "creator", "id", "method", "purpose", "region", "result"]
        );
        assert_eq!(
            registry().operators("communicationDate"),
            vec!["aft", "bef", "in", "win"]
        );
        assert_eq!(registry().operators("creator"), vec!["ctn", "in", "nctn", "nin"]);
    }

    #[test]
    fn test_date_operators_are_strict() {
        assert_eq!(
            before_communication_date(&args(&["2022/12/15"])),
            Scope::Lt {
                field: COMMUNICATION_DATE.to_string(),
                value: date(2022, 12, 15),
            }
        );
        assert_eq!(
            after_communication_date(&args(&["2022-12-31"])),
            Scope::Gt {
                field: COMMUNICATION_DATE.to_string(),
                value: date(2022, 12, 31),
            }
        );
    }

    #[test]
    fn test_within_needs_two_parts() {
        assert_eq!(within_communication_date(&args(&["2022/10/01"])), Scope::All);
        assert_eq!(
            within_communication_date(&args(&["2022/10/01-2022/12/15"])),
            Scope::Between {
                field: COMMUNICATION_DATE.to_string(),
                low: date(2022, 10, 1),
                high: date(2022, 12, 15),
            }
        );
    }

    #[test]
    fn test_win_and_in_agree() {
        let ctx = ScopeContext::default();
        let value = args(&["2022/10/01-2022/12/15"]);
        let win = registry().lookup("communicationDate", "win").unwrap();
        let within = registry().lookup("communicationDate", "in").unwrap();
        assert_eq!(win.apply(&value, &ctx), within.apply(&value, &ctx));
    }

    #[test]
    fn test_id_membership_is_integer() {
        let scope = communication_log_filters_to_scopes(
            &[("id.in", args(&["4", "x"]))].into_iter().collect::<FilterSet>(),
            &ScopeContext::default(),
            None,
        );
        assert_eq!(scope, Scope::is_in(ID, vec![FieldValue::Integer(4)]));
    }

    #[test]
    fn test_column_map_covers_fields() {
        let columns = column_map();
        assert!(columns.resolve(RECIPIENT_ID).array);
        assert_eq!(columns.resolve(CREATOR_NAME).expr, "\"author\".\"name\"");
    }
}
