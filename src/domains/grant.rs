//! Grant filters
//!
//! `startDate` on grants asks whether the grant was active at some point in
//! the requested window rather than when it started: a grant is active from
//! `startDate` through `endDate`, open-ended when it has no end date.

use crate::core::dates::{parse_date, parse_date_range};
use crate::core::field::{FieldKind, FieldValue};
use crate::core::filter_set::FilterSet;
use crate::core::operators::{
    contains_text, not_contains_text, with_membership, without_membership,
};
use crate::core::predicate::{Case, Scope};
use crate::core::registry::TopicRegistry;
use crate::core::scope::{ScopeContext, ValidTopics, filters_to_scopes};
use crate::storage::sql::ColumnMap;
use chrono::NaiveDate;
use std::sync::LazyLock;

pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";
pub const REGION_ID: &str = "regionId";
pub const RECIPIENT_NAME: &str = "recipient.name";
pub const PROGRAM_SPECIALIST: &str = "programSpecialistName";
pub const NUMBER: &str = "number";
pub const STATE_CODE: &str = "stateCode";
pub const PROGRAM_TYPES: &str = "programs.programType";
pub const GROUP_IDS: &str = "groupIds";

static REGISTRY: LazyLock<TopicRegistry> = LazyLock::new(|| {
    TopicRegistry::builder("grant")
        .operator("startDate", "bef", active_before)
        .operator("startDate", "aft", active_after)
        .operator("startDate", "win", active_within)
        .operator("region", "in", with_membership(REGION_ID, FieldKind::Integer))
        .operator("region", "nin", without_membership(REGION_ID, FieldKind::Integer))
        .operator("recipient", "ctn", contains_text(RECIPIENT_NAME, Case::Insensitive))
        .operator("recipient", "nctn", not_contains_text(RECIPIENT_NAME, Case::Insensitive))
        .operator(
            "programSpecialist",
            "ctn",
            contains_text(PROGRAM_SPECIALIST, Case::Insensitive),
        )
        .operator(
            "programSpecialist",
            "nctn",
            not_contains_text(PROGRAM_SPECIALIST, Case::Insensitive),
        )
        .operator("grantNumber", "ctn", contains_text(NUMBER, Case::Insensitive))
        .operator("grantNumber", "nctn", not_contains_text(NUMBER, Case::Insensitive))
        .operator("stateCode", "ctn", contains_text(STATE_CODE, Case::Insensitive))
        .operator("programType", "in", with_membership(PROGRAM_TYPES, FieldKind::Text))
        .operator("programType", "nin", without_membership(PROGRAM_TYPES, FieldKind::Text))
        .operator("group", "in", with_membership(GROUP_IDS, FieldKind::Integer))
        .operator("group", "nin", without_membership(GROUP_IDS, FieldKind::Integer))
        .build()
});

/// Started on or before `day`
fn started_by(day: NaiveDate) -> Scope {
    Scope::Lte {
        field: START_DATE.to_string(),
        value: FieldValue::Date(day),
    }
}

/// Still running on `day`, or open-ended
fn running_on(day: NaiveDate) -> Scope {
    Scope::or([
        Scope::Gte {
            field: END_DATE.to_string(),
            value: FieldValue::Date(day),
        },
        Scope::missing(END_DATE),
    ])
}

fn active_before(args: &[String], _: &ScopeContext) -> Scope {
    args.first()
        .and_then(|raw| parse_date(raw))
        .map(started_by)
        .unwrap_or_default()
}

fn active_after(args: &[String], _: &ScopeContext) -> Scope {
    args.first()
        .and_then(|raw| parse_date(raw))
        .map(running_on)
        .unwrap_or_default()
}

fn active_within(args: &[String], _: &ScopeContext) -> Scope {
    args.first()
        .and_then(|raw| parse_date_range(raw))
        .map(|range| Scope::and([started_by(range.end), running_on(range.start)]))
        .unwrap_or_default()
}

pub fn registry() -> &'static TopicRegistry {
    &REGISTRY
}

/// Translate grant filters
pub fn grant_filters_to_scopes(
    filters: &FilterSet,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    filters_to_scopes(filters, &REGISTRY, context, valid_topics)
}

pub fn column_map() -> ColumnMap {
    ColumnMap::new()
        .scalar(START_DATE, "\"Grant\".\"startDate\"::date")
        .scalar(END_DATE, "\"Grant\".\"endDate\"::date")
        .scalar(REGION_ID, "\"Grant\".\"regionId\"")
        .scalar(RECIPIENT_NAME, "\"recipient\".\"name\"")
        .scalar(PROGRAM_SPECIALIST, "\"Grant\".\"programSpecialistName\"")
        .scalar(NUMBER, "\"Grant\".\"number\"")
        .scalar(STATE_CODE, "\"Grant\".\"stateCode\"")
        .array(PROGRAM_TYPES, "\"programTypes\"")
        .array(GROUP_IDS, "\"groupIds\"")
}
