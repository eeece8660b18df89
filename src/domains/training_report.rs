//! Training report (event) filters

use crate::core::field::FieldKind;
use crate::core::filter_set::FilterSet;
use crate::core::operators::{
    DateBound, after_date, before_date, contains_text, negated, not_contains_text,
    with_membership, within_date, without_membership,
};
use crate::core::predicate::{Case, Scope};
use crate::core::registry::TopicRegistry;
use crate::core::scope::{ScopeContext, ValidTopics, filters_to_scopes};
use crate::storage::sql::ColumnMap;
use std::sync::LazyLock;

pub const START_DATE: &str = "data.startDate";
pub const REGION_ID: &str = "regionId";
pub const EVENT_ID: &str = "data.eventId";
pub const CREATOR_NAME: &str = "owner.name";
pub const CREATOR_NATIONAL_CENTER: &str = "owner.nationalCenters.name";
pub const COLLABORATOR_NATIONAL_CENTER: &str = "collaborators.nationalCenters.name";

static REGISTRY: LazyLock<TopicRegistry> = LazyLock::new(|| {
    TopicRegistry::builder("trainingReport")
        .operator("startDate", "bef", before_date(START_DATE, DateBound::Inclusive))
        .operator("startDate", "aft", after_date(START_DATE, DateBound::Inclusive))
        .operator("startDate", "win", within_date(START_DATE))
        .operator("region", "in", with_membership(REGION_ID, FieldKind::Integer))
        .operator("region", "nin", without_membership(REGION_ID, FieldKind::Integer))
        .operator("eventId", "ctn", contains_text(EVENT_ID, Case::Insensitive))
        .operator("eventId", "nctn", not_contains_text(EVENT_ID, Case::Insensitive))
        .operator("creator", "ctn", contains_text(CREATOR_NAME, Case::Insensitive))
        .operator("creator", "nctn", not_contains_text(CREATOR_NAME, Case::Insensitive))
        .operator("creator", "in", with_membership(CREATOR_NATIONAL_CENTER, FieldKind::Text))
        .operator(
            "creator",
            "nin",
            negated(with_membership(CREATOR_NATIONAL_CENTER, FieldKind::Text)),
        )
        .operator(
            "collaborators",
            "in",
            with_membership(COLLABORATOR_NATIONAL_CENTER, FieldKind::Text),
        )
        .operator(
            "collaborators",
            "nin",
            negated(with_membership(COLLABORATOR_NATIONAL_CENTER, FieldKind::Text)),
        )
        .build()
});

pub fn registry() -> &'static TopicRegistry {
    &REGISTRY
}

/// Translate training report filters
pub fn training_report_filters_to_scopes(
    filters: &FilterSet,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    filters_to_scopes(filters, &REGISTRY, context, valid_topics)
}

pub fn column_map() -> ColumnMap {
    ColumnMap::new()
        .scalar(START_DATE, "(\"EventReportPilot\".\"data\" ->> 'startDate')::date")
        .scalar(REGION_ID, "\"EventReportPilot\".\"regionId\"")
        .scalar(EVENT_ID, "\"EventReportPilot\".\"data\" ->> 'eventId'")
        .scalar(CREATOR_NAME, "\"owner\".\"name\"")
        .array(CREATOR_NATIONAL_CENTER, "\"ownerNationalCenters\"")
        .array(COLLABORATOR_NATIONAL_CENTER, "\"collaboratorNationalCenters\"")
}
