//! Activity report filters

use crate::core::field::{FieldKind, FieldValue};
use crate::core::filter_set::FilterSet;
use crate::core::operators::{
    DateBound, after_date, before_date, contains_in_any, contains_text, negated,
    not_contains_in_any, not_contains_text, with_membership, within_date, without_membership,
};
use crate::core::predicate::{Case, Scope};
use crate::core::registry::TopicRegistry;
use crate::core::scope::{ScopeContext, ValidTopics, filters_to_scopes};
use crate::storage::sql::ColumnMap;
use std::sync::LazyLock;

pub const DISPLAY_ID: &str = "displayId";
pub const START_DATE: &str = "startDate";
pub const LAST_SAVED: &str = "updatedAt";
pub const AUTHOR_ID: &str = "userId";
pub const AUTHOR_NAME: &str = "author.name";
pub const COLLABORATOR_ID: &str = "collaborators.userId";
pub const COLLABORATOR_NAME: &str = "collaborators.name";
pub const APPROVER_ID: &str = "approvers.userId";
pub const TOPICS: &str = "topics";
pub const STATUS: &str = "calculatedStatus";
pub const PROGRAM_SPECIALIST: &str = "recipients.programSpecialistName";
pub const RECIPIENT_NAME: &str = "recipients.name";
pub const RECIPIENT_ID: &str = "recipients.recipientId";
pub const GRANT_NUMBER: &str = "recipients.grantNumber";
pub const RECIPIENT_COUNT: &str = "recipientCount";
pub const REASON: &str = "reason";
pub const REGION_ID: &str = "regionId";

static ROLE_FIELDS: &[&str] = &["author.role", "collaborators.role"];

static REGISTRY: LazyLock<TopicRegistry> = LazyLock::new(|| {
    TopicRegistry::builder("activityReport")
        .operator("reportId", "in", contains_text(DISPLAY_ID, Case::Insensitive))
        .operator("reportId", "nin", not_contains_text(DISPLAY_ID, Case::Insensitive))
        .operator("startDate", "bef", before_date(START_DATE, DateBound::Inclusive))
        .operator("startDate", "aft", after_date(START_DATE, DateBound::Inclusive))
        .operator("startDate", "win", within_date(START_DATE))
        .operator("lastSaved", "bef", before_date(LAST_SAVED, DateBound::Inclusive))
        .operator("lastSaved", "aft", after_date(LAST_SAVED, DateBound::Inclusive))
        .operator("lastSaved", "win", within_date(LAST_SAVED))
        .operator("creator", "in", contains_text(AUTHOR_NAME, Case::Insensitive))
        .operator("creator", "nin", not_contains_text(AUTHOR_NAME, Case::Insensitive))
        .operator("collaborators", "in", contains_text(COLLABORATOR_NAME, Case::Insensitive))
        .operator("collaborators", "nin", not_contains_text(COLLABORATOR_NAME, Case::Insensitive))
        .operator("topic", "in", contains_text(TOPICS, Case::Insensitive))
        .operator("topic", "nin", not_contains_text(TOPICS, Case::Insensitive))
        .operator("status", "in", contains_text(STATUS, Case::Insensitive))
        .operator("status", "nin", not_contains_text(STATUS, Case::Insensitive))
        .operator("role", "in", contains_in_any(ROLE_FIELDS, Case::Insensitive))
        .operator("role", "nin", not_contains_in_any(ROLE_FIELDS, Case::Insensitive))
        .operator("programSpecialist", "in", contains_text(PROGRAM_SPECIALIST, Case::Insensitive))
        .operator(
            "programSpecialist",
            "nin",
            not_contains_text(PROGRAM_SPECIALIST, Case::Insensitive),
        )
        .aliases(
            "recipient",
            &["in", "ctn"],
            contains_text(RECIPIENT_NAME, Case::Insensitive),
        )
        .aliases(
            "recipient",
            &["nin", "nctn"],
            not_contains_text(RECIPIENT_NAME, Case::Insensitive),
        )
        .aliases("recipientId", &["in", "ctn"], with_membership(RECIPIENT_ID, FieldKind::Integer))
        .operator("grantNumber", "ctn", contains_text(GRANT_NUMBER, Case::Insensitive))
        .operator("grantNumber", "nctn", not_contains_text(GRANT_NUMBER, Case::Insensitive))
        .operator("singleOrMultiRecipients", "in", with_recipient_count)
        .operator("reason", "in", with_membership(REASON, FieldKind::Text))
        .operator("reason", "nin", without_membership(REASON, FieldKind::Text))
        .operator("region", "in", with_membership(REGION_ID, FieldKind::Integer))
        .operator("region", "nin", without_membership(REGION_ID, FieldKind::Integer))
        .operator("myReports", "in", my_reports)
        .operator("myReports", "nin", negated(my_reports))
        .build()
});

/// Reports the current user created, collaborates on or approves
///
/// Arguments name the relationships (`Creator`, `Collaborator`, `Approver`);
/// unknown names are ignored. Without a user id the filter is neutral.
fn my_reports(args: &[String], context: &ScopeContext) -> Scope {
    let Some(user_id) = context.user_id else {
        return Scope::All;
    };

    let relations: Vec<Scope> = args
        .iter()
        .filter_map(|role| match role.as_str() {
            "Creator" => Some(AUTHOR_ID),
            "Collaborator" => Some(COLLABORATOR_ID),
            "Approver" => Some(APPROVER_ID),
            _ => None,
        })
        .map(|field| Scope::equals(field, user_id))
        .collect();

    if relations.is_empty() {
        Scope::All
    } else {
        Scope::or(relations)
    }
}

/// `single-recipient` / `multi-recipients`; other values are ignored
fn with_recipient_count(args: &[String], _: &ScopeContext) -> Scope {
    let one = FieldValue::Integer(1);
    let parts: Vec<Scope> = args
        .iter()
        .filter_map(|kind| match kind.as_str() {
            "single-recipient" => Some(Scope::Lte {
                field: RECIPIENT_COUNT.to_string(),
                value: one.clone(),
            }),
            "multi-recipients" => Some(Scope::Gt {
                field: RECIPIENT_COUNT.to_string(),
                value: one.clone(),
            }),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        Scope::All
    } else {
        Scope::or(parts)
    }
}

pub fn registry() -> &'static TopicRegistry {
    &REGISTRY
}

/// Translate activity report filters
pub fn activity_report_filters_to_scopes(
    filters: &FilterSet,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    filters_to_scopes(filters, &REGISTRY, context, valid_topics)
}

pub fn column_map() -> ColumnMap {
    ColumnMap::new()
        .scalar(DISPLAY_ID, "\"ActivityReport\".\"displayId\"")
        .scalar(START_DATE, "\"ActivityReport\".\"startDate\"")
        .scalar(LAST_SAVED, "\"ActivityReport\".\"updatedAt\"::date")
        .scalar(AUTHOR_ID, "\"ActivityReport\".\"userId\"")
        .scalar(AUTHOR_NAME, "\"author\".\"name\"")
        .scalar("author.role", "\"author\".\"role\"::text")
        .array(COLLABORATOR_ID, "\"collaboratorIds\"")
        .array(COLLABORATOR_NAME, "\"collaboratorNames\"")
        .array("collaborators.role", "\"collaboratorRoles\"")
        .array(APPROVER_ID, "\"approverIds\"")
        .array(TOPICS, "\"ActivityReport\".\"topics\"")
        .scalar(STATUS, "\"ActivityReport\".\"calculatedStatus\"::text")
        .array(PROGRAM_SPECIALIST, "\"programSpecialistNames\"")
        .array(RECIPIENT_NAME, "\"recipientNames\"")
        .array(RECIPIENT_ID, "\"recipientIds\"")
        .array(GRANT_NUMBER, "\"grantNumbers\"")
        .scalar(RECIPIENT_COUNT, "cardinality(\"recipientIds\")")
        .array(REASON, "\"ActivityReport\".\"reason\"")
        .scalar(REGION_ID, "\"ActivityReport\".\"regionId\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn report() -> Value {
        json!({
            "id": 1,
            "displayId": "R01-AR-1001",
            "regionId": 1,
            "userId": 10,
            "author": {"name": "Sam Author", "role": "Grantee Specialist"},
            "collaborators": [{"userId": 11, "name": "Casey Helper", "role": "Health Specialist"}],
            "approvers": [{"userId": 12}],
            "topics": ["Coaching", "Behavioral / Mental Health / Trauma"],
            "calculatedStatus": "approved",
            "reason": ["Monitoring | Area of Concern"],
            "startDate": "2021/06/06",
            "updatedAt": "2021-06-20T10:00:00Z",
            "recipientCount": 1,
            "recipients": [{
                "name": "Happy Kids Inc",
                "recipientId": 54,
                "grantNumber": "01CH012345",
                "programSpecialistName": "Pat Specialist"
            }]
        })
    }

    fn scope(filters: Value, ctx: &ScopeContext) -> Scope {
        activity_report_filters_to_scopes(&FilterSet::from_value(&filters), ctx, None)
    }

    #[test]
    fn test_text_topics_match_case_insensitively() {
        let ctx = ScopeContext::default();
        let record = report();
        assert!(scope(json!({"reportId.in": ["ar-1001"]}), &ctx).matches(&record));
        assert!(!scope(json!({"reportId.nin": ["1001"]}), &ctx).matches(&record));
        assert!(scope(json!({"creator.in": ["sam"]}), &ctx).matches(&record));
        assert!(scope(json!({"collaborators.in": ["casey"]}), &ctx).matches(&record));
        assert!(scope(json!({"topic.in": ["mental health"]}), &ctx).matches(&record));
        assert!(!scope(json!({"topic.nin": ["coaching"]}), &ctx).matches(&record));
        assert!(scope(json!({"status.in": ["Approved"]}), &ctx).matches(&record));
        assert!(scope(json!({"programSpecialist.in": ["pat"]}), &ctx).matches(&record));
        assert!(scope(json!({"recipient.ctn": ["happy"]}), &ctx).matches(&record));
        assert!(!scope(json!({"recipient.nctn": ["happy"]}), &ctx).matches(&record));
    }

    #[test]
    fn test_recipient_grant_number_and_id() {
        let ctx = ScopeContext::default();
        let record = report();
        assert!(scope(json!({"grantNumber.ctn": ["ch0123"]}), &ctx).matches(&record));
        assert!(!scope(json!({"grantNumber.ctn": ["789"]}), &ctx).matches(&record));
        assert!(!scope(json!({"grantNumber.nctn": ["0123"]}), &ctx).matches(&record));
        assert!(scope(json!({"recipientId.ctn": ["54"]}), &ctx).matches(&record));
        assert!(scope(json!({"recipientId.in": [54, 56]}), &ctx).matches(&record));
        assert!(!scope(json!({"recipientId.ctn": ["56"]}), &ctx).matches(&record));
    }

    #[test]
    fn test_single_or_multi_recipients() {
        let ctx = ScopeContext::default();
        let single = report();
        let mut multi = report();
        multi["recipientCount"] = json!(2);

        let singles = scope(json!({"singleOrMultiRecipients.in": ["single-recipient"]}), &ctx);
        let multis = scope(json!({"singleOrMultiRecipients.in": ["multi-recipients"]}), &ctx);
        assert!(singles.matches(&single));
        assert!(!singles.matches(&multi));
        assert!(multis.matches(&multi));
        assert!(!multis.matches(&single));
        assert_eq!(scope(json!({"singleOrMultiRecipients.in": ["several"]}), &ctx), Scope::All);
    }

    #[test]
    fn test_role_matches_author_or_collaborator() {
        let ctx = ScopeContext::default();
        let record = report();
        assert!(scope(json!({"role.in": ["health"]}), &ctx).matches(&record));
        assert!(scope(json!({"role.in": ["grantee"]}), &ctx).matches(&record));
        assert!(!scope(json!({"role.nin": ["health"]}), &ctx).matches(&record));
    }

    #[test]
    fn test_dates_are_inclusive() {
        let ctx = ScopeContext::default();
        let record = report();
        assert!(scope(json!({"startDate.bef": ["2021/06/06"]}), &ctx).matches(&record));
        assert!(scope(json!({"startDate.aft": ["2021/06/06"]}), &ctx).matches(&record));
        assert!(scope(json!({"lastSaved.win": ["2021/06/20-2021/06/20"]}), &ctx).matches(&record));
        assert!(!scope(json!({"lastSaved.bef": ["2021/06/19"]}), &ctx).matches(&record));
    }

    #[test]
    fn test_my_reports() {
        let record = report();
        let author = ScopeContext::for_user(10);
        let approver = ScopeContext::for_user(12);
        let stranger = ScopeContext::for_user(99);

        assert!(scope(json!({"myReports.in": ["Creator"]}), &author).matches(&record));
        assert!(!scope(json!({"myReports.in": ["Approver"]}), &author).matches(&record));
        assert!(scope(json!({"myReports.in": ["Creator", "Approver"]}), &approver).matches(&record));
        assert!(!scope(json!({"myReports.in": ["Creator", "Collaborator", "Approver"]}), &stranger)
            .matches(&record));
        assert!(scope(json!({"myReports.nin": ["Creator"]}), &approver).matches(&record));
    }

    #[test]
    fn test_my_reports_without_user_is_neutral() {
        let ctx = ScopeContext::default();
        assert_eq!(scope(json!({"myReports.in": ["Creator"]}), &ctx), Scope::All);
        assert_eq!(scope(json!({"myReports.nin": ["Creator"]}), &ctx), Scope::All);
        assert_eq!(
            scope(json!({"myReports.in": ["Owner"]}), &ScopeContext::for_user(1)),
            Scope::All
        );
    }

    #[test]
    fn test_region_and_reason_membership() {
        let ctx = ScopeContext::default();
        let record = report();
        assert!(scope(json!({"region.in": ["1"], "reason.in": ["Monitoring | Area of Concern"]}), &ctx)
            .matches(&record));
        assert!(!scope(json!({"region.nin": [1]}), &ctx).matches(&record));
    }
}
