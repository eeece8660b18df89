//! In-memory implementation of ScopedStore for testing and development

use crate::core::dates::parse_date;
use crate::core::predicate::{Scope, resolve};
use crate::core::query::{Direction, Page, PageRequest};
use crate::core::store::ScopedStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory record store
///
/// Records are plain JSON objects evaluated with [`Scope::matches`]. Uses
/// RwLock for thread-safe access; clones share the same records.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Value>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`
    pub fn with_records(records: impl IntoIterator<Item = Value>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    fn matching(&self, scope: &Scope) -> Result<Vec<Value>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records
            .iter()
            .filter(|record| scope.matches(record))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScopedStore for InMemoryRecordStore {
    async fn insert(&self, record: Value) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.push(record);

        Ok(())
    }

    async fn find_all(&self, scope: &Scope) -> Result<Vec<Value>> {
        self.matching(scope)
    }

    async fn find_page(&self, scope: &Scope, request: &PageRequest) -> Result<Page> {
        let mut rows = self.matching(scope)?;
        let count = rows.len();

        if let Some(field) = &request.sort_by {
            rows.sort_by(|a, b| {
                compare_sort_keys(
                    resolve(a, field).first().copied(),
                    resolve(b, field).first().copied(),
                    request.direction,
                )
            });
        }

        let rows = rows
            .into_iter()
            .skip(request.offset)
            .take(request.limit())
            .collect();

        Ok(Page { rows, count })
    }
}

/// Dates chronologically, numbers numerically, anything else as text;
/// records without the field sort last in either direction
fn compare_sort_keys(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ordering = if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    } else if let (Some(x), Some(y)) = (
        a.as_str().and_then(parse_date),
        b.as_str().and_then(parse_date),
    ) {
        x.cmp(&y)
    } else {
        a.to_string().cmp(&b.to_string())
    };

    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}
