//! Paging and sorting for scoped list queries

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Paging parameters for a scoped list
///
/// # Example
/// ```rust,ignore
/// // GET /recipients/7/communication-logs?sortBy=communicationDate&direction=DESC&offset=0&limit=10
/// let page = store.find_page(&scope, &PageRequest::default().sort_by("data.communicationDate", Direction::Desc)).await?;
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageRequest {
    /// Rows to skip
    pub offset: usize,

    /// Rows per page
    pub limit: usize,

    /// Field path to sort by; unsorted when absent
    pub sort_by: Option<String>,

    pub direction: Direction,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
            sort_by: None,
            direction: Direction::Asc,
        }
    }
}

fn default_limit() -> usize {
    10
}

impl PageRequest {
    pub fn sort_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort_by = Some(field.into());
        self.direction = direction;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Limit clamped to 1..=100
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100)
    }
}

/// One page of scoped rows plus the total match count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T = Value> {
    pub rows: Vec<T>,

    /// Total number of rows matching the scope, across all pages
    pub count: usize,
}

impl<T> Page<T> {
    /// Whether rows remain after this page
    pub fn has_more(&self, request: &PageRequest) -> bool {
        request.offset + self.rows.len() < self.count
    }
}
