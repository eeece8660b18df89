//! Filter domains
//!
//! One registry per kind of record the hub lists. Each submodule owns its
//! static registry, the field paths its operators read, a
//! `<domain>_filters_to_scopes` helper and a PostgreSQL [`ColumnMap`].
//!
//! [`ColumnMap`]: crate::storage::sql::ColumnMap

pub mod activity_report;
pub mod communication_log;
pub mod goal;
pub mod grant;
pub mod training_report;

use crate::core::error::ConfigError;
use crate::core::filter_set::FilterSet;
use crate::core::predicate::Scope;
use crate::core::registry::TopicRegistry;
use crate::core::scope::{ScopeContext, ValidTopics, filters_to_scopes};
use crate::storage::sql::ColumnMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use activity_report::activity_report_filters_to_scopes;
pub use communication_log::{
    after_communication_date, before_communication_date, communication_log_filters_to_scopes,
    within_communication_date,
};
pub use goal::goal_filters_to_scopes;
pub use grant::grant_filters_to_scopes;
pub use training_report::training_report_filters_to_scopes;

/// A filterable record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    ActivityReport,
    Goal,
    Grant,
    TrainingReport,
    CommunicationLog,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::ActivityReport,
        Domain::Goal,
        Domain::Grant,
        Domain::TrainingReport,
        Domain::CommunicationLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::ActivityReport => "activityReport",
            Domain::Goal => "goal",
            Domain::Grant => "grant",
            Domain::TrainingReport => "trainingReport",
            Domain::CommunicationLog => "communicationLog",
        }
    }

    pub fn registry(&self) -> &'static TopicRegistry {
        match self {
            Domain::ActivityReport => activity_report::registry(),
            Domain::Goal => goal::registry(),
            Domain::Grant => grant::registry(),
            Domain::TrainingReport => training_report::registry(),
            Domain::CommunicationLog => communication_log::registry(),
        }
    }

    pub fn column_map(&self) -> ColumnMap {
        match self {
            Domain::ActivityReport => activity_report::column_map(),
            Domain::Goal => goal::column_map(),
            Domain::Grant => grant::column_map(),
            Domain::TrainingReport => training_report::column_map(),
            Domain::CommunicationLog => communication_log::column_map(),
        }
    }

    /// Translate `filters` with this domain's registry
    pub fn filters_to_scopes(
        &self,
        filters: &FilterSet,
        context: &ScopeContext,
        valid_topics: Option<&ValidTopics>,
    ) -> Scope {
        filters_to_scopes(filters, self.registry(), context, valid_topics)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownDomain(s.to_string()))
    }
}

/// One scope per domain, all built from the same filter set
///
/// Dashboards apply a single query string to several lists at once; each
/// domain keeps the topics it knows and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScopes {
    pub activity_report: Scope,
    pub goal: Scope,
    pub grant: Scope,
    pub training_report: Scope,
    pub communication_log: Scope,
}

impl DomainScopes {
    pub fn get(&self, domain: Domain) -> &Scope {
        match domain {
            Domain::ActivityReport => &self.activity_report,
            Domain::Goal => &self.goal,
            Domain::Grant => &self.grant,
            Domain::TrainingReport => &self.training_report,
            Domain::CommunicationLog => &self.communication_log,
        }
    }
}

/// Translate `filters` for every domain
pub fn filters_to_all_scopes(filters: &FilterSet, context: &ScopeContext) -> DomainScopes {
    DomainScopes {
        activity_report: activity_report_filters_to_scopes(filters, context, None),
        goal: goal_filters_to_scopes(filters, context, None),
        grant: grant_filters_to_scopes(filters, context, None),
        training_report: training_report_filters_to_scopes(filters, context, None),
        communication_log: communication_log_filters_to_scopes(filters, context, None),
    }
}
