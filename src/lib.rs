//! # TTA Hub filter scopes
//!
//! Translates the filters a list or search endpoint receives
//! (`?result.in=Phone&communicationDate.win=2022/10/01-2022/12/15`) into a
//! composable [`Scope`](core::Scope) predicate that a store can execute.
//!
//! ## Features
//!
//! - **Topic registries**: one static `topic → operator → transform` table per domain
//! - **Forgiving input**: unknown topics, unknown operators and malformed values are ignored
//! - **Canonical scopes**: the result does not depend on filter order
//! - **Loose dates**: `YYYY/MM/DD`, `YYYY-MM-DD`, `MM/DD/YYYY` and `start-end` ranges
//! - **Configurable surfaces**: per-endpoint topic allow-lists loaded from YAML
//! - **Two executors**: in-memory evaluation over JSON records, PostgreSQL `WHERE` rendering
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scopes::prelude::*;
//!
//! let filters = FilterSet::from_query_pairs([
//!     ("result.in", "Phone"),
//!     ("communicationDate.win", "2022/10/01-2022/12/15"),
//! ]);
//!
//! let scope = Scope::and([
//!     communication_log::for_recipient(7),
//!     communication_log_filters_to_scopes(&filters, &ScopeContext::for_user(3), None),
//! ]);
//!
//! let rows = store.find_all(&scope).await?;
//! let sql = render_where(&scope, &communication_log::column_map());
//! ```

pub mod config;
pub mod core;
pub mod domains;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::ConfigError,
        field::{FieldKind, FieldValue},
        filter_set::FilterSet,
        predicate::{Case, Scope},
        query::{Direction, Page, PageRequest},
        registry::TopicRegistry,
        scope::{ScopeContext, ScopeOptions, ValidTopics, filters_to_scopes},
        store::ScopedStore,
    };

    // === Domains ===
    pub use crate::domains::{
        Domain, DomainScopes, activity_report, activity_report_filters_to_scopes,
        communication_log, communication_log_filters_to_scopes, filters_to_all_scopes, goal,
        goal_filters_to_scopes, grant, grant_filters_to_scopes, training_report,
        training_report_filters_to_scopes, within_communication_date,
    };

    // === Config ===
    pub use crate::config::{FilterSurfacesConfig, SurfaceConfig};

    // === Storage ===
    pub use crate::storage::{ColumnMap, InMemoryRecordStore, SqlWhere, render_where};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
