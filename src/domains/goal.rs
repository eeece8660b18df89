//! Goal filters
//!
//! A goal record embeds its grant, objectives and the activity reports that
//! reference it, so every topic here is a path into one JSON document.

use crate::core::field::FieldKind;
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

pub const CREATED_AT: &str = "createdAt";
pub const STATUS: &str = "status";
pub const REASONS: &str = "reasons";
pub const TOPICS: &str = "topics";
pub const RECIPIENT_ID: &str = "grant.recipientId";
pub const REGION_ID: &str = "grant.regionId";
pub const GRANT_NUMBER: &str = "grant.number";
pub const IS_RTTAPA: &str = "isRttapa";
pub const GROUP_IDS: &str = "groupIds";

/// Status filter value standing for goals that have no status yet
pub const NEEDS_STATUS: &str = "Needs status";

static REPORT_TEXT_FIELDS: &[&str] = &[
    "name",
    "objectives.title",
    "objectives.ttaProvided",
    "activityReports.context",
    "activityReports.additionalNotes",
];

static RESOURCE_URL_FIELDS: &[&str] = &[
    "activityReports.resources.url",
    "activityReports.goalResources.url",
    "objectives.resources.url",
    "activityReports.nextSteps.resources.url",
];

static REGISTRY: LazyLock<TopicRegistry> = LazyLock::new(|| {
    TopicRegistry::builder("goal")
        .operator("createDate", "bef", before_date(CREATED_AT, DateBound::Inclusive))
        .operator("createDate", "aft", after_date(CREATED_AT, DateBound::Inclusive))
        .operator("createDate", "win", within_date(CREATED_AT))
        .operator("status", "in", with_status)
        .operator("status", "nin", negated(with_status))
        .operator("reason", "in", with_membership(REASONS, FieldKind::Text))
        .operator("reason", "nin", without_membership(REASONS, FieldKind::Text))
        .operator("topic", "in", with_membership(TOPICS, FieldKind::Text))
        .operator("topic", "nin", without_membership(TOPICS, FieldKind::Text))
        .aliases("recipientId", &["in", "ctn"], with_membership(RECIPIENT_ID, FieldKind::Integer))
        .operator("region", "in", with_membership(REGION_ID, FieldKind::Integer))
        .operator("region", "nin", without_membership(REGION_ID, FieldKind::Integer))
        .operator("grantNumber", "in", contains_text(GRANT_NUMBER, Case::Insensitive))
        .operator("grantNumber", "nin", not_contains_text(GRANT_NUMBER, Case::Insensitive))
        .operator("goalType", "in", with_goal_type)
        .operator("goalType", "nin", negated(with_goal_type))
        .operator("reportText", "ctn", contains_in_any(REPORT_TEXT_FIELDS, Case::Insensitive))
        .operator(
            "reportText",
            "nctn",
            not_contains_in_any(REPORT_TEXT_FIELDS, Case::Insensitive),
        )
        .operator("resourceUrl", "ctn", contains_in_any(RESOURCE_URL_FIELDS, Case::Insensitive))
        .operator(
            "resourceUrl",
            "nctn",
            not_contains_in_any(RESOURCE_URL_FIELDS, Case::Insensitive),
        )
        .operator("group", "in", with_membership(GROUP_IDS, FieldKind::Integer))
        .operator("group", "nin", without_membership(GROUP_IDS, FieldKind::Integer))
        .build()
});

/// Status membership where [`NEEDS_STATUS`] selects goals without a status
fn with_status(args: &[String], _: &ScopeContext) -> Scope {
    let needs_status = args.iter().any(|a| a == NEEDS_STATUS);
    let statuses = FieldKind::Text.parse_all(
        &args
            .iter()
            .filter(|a| a.as_str() != NEEDS_STATUS)
            .cloned()
            .collect::<Vec<_>>(),
    );

    let mut parts = Vec::new();
    if !statuses.is_empty() {
        parts.push(Scope::is_in(STATUS, statuses));
    }
    if needs_status {
        parts.push(Scope::missing(STATUS));
    }

    if parts.is_empty() {
        Scope::All
    } else {
        Scope::or(parts)
    }
}

/// `RTTAPA` / `Non-RTTAPA`; other values are ignored
fn with_goal_type(args: &[String], _: &ScopeContext) -> Scope {
    let parts: Vec<Scope> = args
        .iter()
        .filter_map(|goal_type| match goal_type.as_str() {
            "RTTAPA" => Some(Scope::equals(IS_RTTAPA, "Yes")),
            "Non-RTTAPA" => Some(Scope::or([
                Scope::equals(IS_RTTAPA, "No"),
                Scope::missing(IS_RTTAPA),
            ])),
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

/// Translate goal filters
pub fn goal_filters_to_scopes(
    filters: &FilterSet,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    filters_to_scopes(filters, &REGISTRY, context, valid_topics)
}

pub fn column_map() -> ColumnMap {
    ColumnMap::new()
        .scalar(CREATED_AT, "\"Goal\".\"createdAt\"::date")
        .scalar(STATUS, "\"Goal\".\"status\"")
        .array(REASONS, "\"reasons\"")
        .array(TOPICS, "\"topics\"")
        .scalar(RECIPIENT_ID, "\"grant\".\"recipientId\"")
        .scalar(REGION_ID, "\"grant\".\"regionId\"")
        .scalar(GRANT_NUMBER, "\"grant\".\"number\"")
        .scalar(IS_RTTAPA, "\"Goal\".\"isRttapa\"::text")
        .array(GROUP_IDS, "\"groupIds\"")
        .scalar("name", "\"Goal\".\"name\"")
        .array("objectives.title", "\"objectiveTitles\"")
        .array("objectives.ttaProvided", "\"objectiveTtaProvided\"")
        .array("activityReports.context", "\"reportContexts\"")
        .array("activityReports.additionalNotes", "\"reportAdditionalNotes\"")
        .array("activityReports.resources.url", "\"reportResourceUrls\"")
        .array("activityReports.goalResources.url", "\"reportGoalResourceUrls\"")
        .array("objectives.resources.url", "\"objectiveResourceUrls\"")
        .array("activityReports.nextSteps.resources.url", "\"nextStepResourceUrls\"")
}
